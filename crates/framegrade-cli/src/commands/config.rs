use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use framegrade_core::pipeline::config::AnalyzerConfig;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProfileArg {
    /// Full-length sampling with the reference thresholds
    #[default]
    Default,
    /// Few frames at 1 fps with thresholds for full-resolution phone footage
    Compact,
}

impl ProfileArg {
    pub fn config(self) -> AnalyzerConfig {
        match self {
            Self::Default => AnalyzerConfig::default(),
            Self::Compact => AnalyzerConfig::compact(),
        }
    }
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Built-in profile to print
    #[arg(long, value_enum, default_value = "default")]
    pub profile: ProfileArg,
}

/// Print or save a full AnalyzerConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = args.profile.config();
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}

/// Load an AnalyzerConfig from a TOML file; missing keys take defaults.
pub fn load(path: &Path) -> Result<AnalyzerConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).context("Invalid analyzer config")
}
