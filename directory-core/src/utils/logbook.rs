// src/utils/logbook.rs
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    io::{BufRead, BufReader, Write},
    path::Path,
};

/// Append one JSON line to `path`, creating parent directories as needed.
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create_dir_all({:?})", dir))?;
    }
    let json = serde_json::to_string(record)?;
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {:?}", path))?;
    writeln!(f, "{}", json)?;
    Ok(())
}

/// Read every parseable line of a JSONL file. Missing file reads as empty;
/// malformed lines are skipped.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let f = fs::File::open(path).with_context(|| format!("open {:?}", path))?;
    let mut out = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(v) => out.push(v),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "skipping malformed logbook line"
            ),
        }
    }
    Ok(out)
}

/// First `max` characters of `content`, never splitting a char.
pub fn preview(content: &str, max: usize) -> String {
    content.chars().take(max).collect()
}
