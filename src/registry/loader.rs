//! Loads record type definitions from disk
//!
//! - Definitions live at `<data_dir>/metadata/record_types/<name>.json`
//! - One file per record type
//! - Unreadable or invalid files are fatal: a host must not validate records
//!   against a partial rule set

use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{RegistryError, RegistryResult};
use super::types::RecordType;
use super::Registry;

/// Reads and writes record type definition files
pub struct RegistryLoader {
    definition_dir: PathBuf,
}

impl RegistryLoader {
    /// Definition files are expected at `<data_dir>/metadata/record_types/`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            definition_dir: data_dir.join("metadata").join("record_types"),
        }
    }

    pub fn definition_dir(&self) -> &Path {
        &self.definition_dir
    }

    /// Loads every `*.json` definition into `registry`, in file name order.
    ///
    /// Returns the number of record types loaded. A missing directory is
    /// created and yields zero.
    pub fn load_into(&self, registry: &mut Registry) -> RegistryResult<usize> {
        if !self.definition_dir.exists() {
            fs::create_dir_all(&self.definition_dir).map_err(|e| {
                RegistryError::malformed(
                    self.definition_dir.display().to_string(),
                    format!("Failed to create definition directory: {}", e),
                )
            })?;
            return Ok(0);
        }

        let entries = fs::read_dir(&self.definition_dir).map_err(|e| {
            RegistryError::malformed(
                self.definition_dir.display().to_string(),
                format!("Failed to read definition directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                RegistryError::malformed(
                    self.definition_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            registry.register(Self::read_definition(path)?)?;
        }

        Ok(paths.len())
    }

    fn read_definition(path: &Path) -> RegistryResult<RecordType> {
        let content = fs::read_to_string(path).map_err(|e| {
            RegistryError::malformed(path.display().to_string(), format!("Failed to read file: {}", e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            RegistryError::malformed(path.display().to_string(), format!("Invalid JSON: {}", e))
        })
    }

    /// Writes a definition file. Existing files are never overwritten.
    pub fn save(&self, record_type: &RecordType) -> RegistryResult<PathBuf> {
        record_type.validate_structure()?;

        let path = self.definition_dir.join(format!("{}.json", record_type.name));
        if path.exists() {
            return Err(RegistryError::immutable(&record_type.name));
        }

        fs::create_dir_all(&self.definition_dir).map_err(|e| {
            RegistryError::malformed(
                self.definition_dir.display().to_string(),
                format!("Failed to create definition directory: {}", e),
            )
        })?;

        let content = serde_json::to_string_pretty(record_type).map_err(|e| {
            RegistryError::malformed(path.display().to_string(), format!("Failed to serialize: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            RegistryError::malformed(path.display().to_string(), format!("Failed to write file: {}", e))
        })?;

        Ok(path)
    }
}
