//! Roster import from pasted text or CSV files.

use std::fs;
use std::path::Path;

use crate::error::{LollyError, LollyResult};

/// Split raw text on newlines and commas into trimmed, non-empty names.
pub fn parse_names(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a roster file and parse its names.
///
/// Fails if the file cannot be read or contains no names.
pub fn read_roster(path: &Path) -> LollyResult<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|source| LollyError::Import {
        path: path.to_path_buf(),
        source,
    })?;
    let names = parse_names(&raw);
    if names.is_empty() {
        return Err(LollyError::NoNames);
    }
    Ok(names)
}
