use anyhow::Result;

use gramforge_core::archive::ArchiveStore;
use gramforge_core::config::EngineConfig;
use gramforge_infrastructure::FsArchiveStore;

/// Lists the archived choices snapshots in serial order.
pub async fn run(config: &EngineConfig) -> Result<()> {
    let store = FsArchiveStore::new(config.saved_choices_dir());
    let snapshots = store.snapshots().await?;

    if snapshots.is_empty() {
        println!("no archived snapshots");
        return Ok(());
    }

    for snapshot in snapshots {
        let created = snapshot
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6}  {}  {}",
            snapshot.serial,
            created,
            snapshot.path.display()
        );
    }
    Ok(())
}
