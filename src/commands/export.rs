use anyhow::{Context, Result};
use std::path::Path;
use wptree::parser::save_jsonl;
use wptree::table::EXPORT_ONLY_FIELDS;

use super::{TableOptions, load_table, print_failure_banner};

pub fn run(dir: &Path, options: &TableOptions, output: &Path, json: bool) -> Result<()> {
    let mut loaded = load_table(dir, options)?;
    print_failure_banner(&loaded.failures);

    let written = loaded
        .table
        .export_with(&EXPORT_ONLY_FIELDS, |table| {
            let rows = table.export_rows();
            save_jsonl(&rows, output).map(|()| rows.len())
        })
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    if json {
        let out = serde_json::json!({
            "output": output.display().to_string(),
            "rows": written,
            "failed_sources": loaded.failures.len(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Exported {} rows to {}", written, output.display());
    }
    Ok(())
}
