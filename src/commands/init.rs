use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use wptree::config::Config;

/// Default content for .wptree/.gitignore
const GITIGNORE_CONTENT: &str = r#"# wptree gitignore
# Exports can be regenerated from the sources
*.jsonl
"#;

pub fn run(dir: &Path, sources: &[String]) -> Result<()> {
    if dir.join("config.toml").exists() {
        anyhow::bail!("wptree already initialized at {}", dir.display());
    }

    fs::create_dir_all(dir).context("Failed to create wptree directory")?;

    let gitignore_path = dir.join(".gitignore");
    fs::write(&gitignore_path, GITIGNORE_CONTENT).context("Failed to create .gitignore")?;

    Config::init(dir)?;
    if !sources.is_empty() {
        let mut config = Config::load(dir)?;
        config.sources.urls = sources.to_vec();
        config.save(dir)?;
    }

    println!("Initialized wptree at {}", dir.display());
    if sources.is_empty() {
        println!("Add sources under [sources] in config.toml or pass --source to show/export");
    }
    Ok(())
}
