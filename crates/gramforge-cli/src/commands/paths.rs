use gramforge_core::config::EngineConfig;

/// Prints the resolved storage layout.
pub fn run(config: &EngineConfig) {
    println!("root:          {}", config.root().display());
    println!("sessions:      {}", config.sessions_dir().display());
    println!("saved-choices: {}", config.saved_choices_dir().display());
    println!("samples:       {}", config.samples_dir().display());
}
