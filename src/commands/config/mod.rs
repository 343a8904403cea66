use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand, Clone, PartialEq, Eq, Debug)]
pub enum ConfigCommands {
    /// Print JSON Schema for ~/.config/ghpr/config.yaml
    Schema,
}

impl ConfigCommands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Self::Schema => {
                let schema = crate::shared::config::generate_schema();
                let json = serde_json::to_string_pretty(&schema)?;
                println!("{json}");
                Ok(())
            }
        }
    }
}
