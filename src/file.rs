//! Backing file for the product collection.
//!
//! The file holds a single pretty-printed JSON array and is rewritten in full
//! on every save. There is no header or version marker.

use crate::error::{Result, StoreError};
use crate::types::Product;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes the product array at a fixed path.
#[derive(Clone, Debug)]
pub struct ProductFile {
    path: PathBuf,
}

impl ProductFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    pub fn load(&self) -> Result<Vec<Product>> {
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|e| StoreError::Deserialization(e.to_string()))
    }

    /// Overwrite the file with the given collection.
    pub fn save(&self, products: &[Product]) -> Result<()> {
        let encoded = serde_json::to_string_pretty(products)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        file.write_all(encoded.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}
