use anyhow::Result;
use std::path::Path;
use wptree::config::Config;

/// Print the effective configuration
pub fn run(dir: &Path, json: bool) -> Result<()> {
    let config = Config::load(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("# {}", dir.join("config.toml").display());
        print!("{}", toml::to_string_pretty(&config)?);
    }
    Ok(())
}
