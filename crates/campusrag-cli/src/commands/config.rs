//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use anyhow::{bail, Result};
use campusrag_core::Config;
use std::path::Path;

pub fn run(args: ConfigArgs, path: &Path, format: OutputFormat) -> Result<()> {
    let config = Config::load_from(path)?;

    match args.action {
        ConfigAction::Show => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => {
                    println!("# {}", path.display());
                    print!("{}", serde_yaml::to_string(&config)?);
                }
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            config.save_to(path)?;
            println!("Wrote configuration to {}", path.display());
        }
    }
    Ok(())
}
