pub mod archive;
pub mod paths;
pub mod request;

use anyhow::{Context, Result};
use std::path::Path;

use gramforge_core::config::EngineConfig;
use gramforge_infrastructure::paths::GramforgePaths;

/// Resolves the engine configuration.
///
/// Precedence: explicit config file, explicit root, the platform config
/// file if one exists, the platform default root.
pub fn load_config(config_path: Option<&Path>, root: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = config_path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        return Ok(EngineConfig::from_toml(&text)?);
    }
    if let Some(root) = root {
        return Ok(EngineConfig::with_root(root));
    }

    let default_config = GramforgePaths::config_file()?;
    if default_config.exists() {
        let text = std::fs::read_to_string(&default_config).with_context(|| {
            format!("Failed to read config file '{}'", default_config.display())
        })?;
        return Ok(EngineConfig::from_toml(&text)?);
    }

    Ok(EngineConfig::with_root(GramforgePaths::default_root()?))
}
