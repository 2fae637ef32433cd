use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::payload::Payload;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected data structure: {0}")]
    Structure(String),
}

/// Validate and decode a fetched document.
///
/// The document must carry its work packages under `_embedded.elements`, and
/// every element must have the relations the mapper reads. Anything else is a
/// structural error for the document as a whole.
pub fn parse_payload_value(value: Value) -> Result<Payload, ParseError> {
    let has_elements = value
        .get("_embedded")
        .and_then(|embedded| embedded.get("elements"))
        .is_some_and(Value::is_array);
    if !has_elements {
        return Err(ParseError::Structure(
            "missing _embedded.elements collection".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| ParseError::Structure(e.to_string()))
}

pub fn parse_payload(text: &str) -> Result<Payload, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    parse_payload_value(value)
}

/// Load a document saved to disk (e.g. a nightly API dump)
pub fn load_payload<P: AsRef<Path>>(path: P) -> Result<Payload, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_payload(&text)
}

/// Write rows as JSON lines.
///
/// Writes to a temporary file next to `path` and renames it into place, so a
/// crash mid-write leaves any previous export intact.
pub fn save_jsonl<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<(), ParseError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let tmp_path = parent.join(format!(".export.tmp.{}", std::process::id()));

    let result = (|| -> Result<(), ParseError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        for row in rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        let file: File = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        Ok(())
    })();

    if result.is_ok() {
        fs::rename(&tmp_path, path)?;
    } else {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}
