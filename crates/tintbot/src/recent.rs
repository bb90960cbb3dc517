//! Recent-name persistence: a JSON array of names, oldest first.

use std::fs;
use std::io;
use std::path::Path;

use tintbot_core::RecentNameMemory;

use crate::error::{CliError, Result};

/// Load a memory of `capacity` names; a missing file is an empty memory.
pub fn load(path: &Path, capacity: usize) -> Result<RecentNameMemory> {
    let names: Vec<String> = match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Vec::new(),
        Ok(content) => serde_json::from_str(&content)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(source) => return Err(CliError::read_file(path, source)),
    };
    Ok(RecentNameMemory::from_names(capacity, names)?)
}

/// Write the memory back, replacing the file.
pub fn save(path: &Path, memory: &RecentNameMemory) -> Result<()> {
    let names: Vec<&str> = memory.names().collect();
    let mut json = serde_json::to_string_pretty(&names)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
