//! # Product Store
//!
//! A small record manager that keeps product records in memory and persists
//! them to a single JSON file.
//!
//! ## Core Concepts
//!
//! - **Products**: records with a store-assigned id and a unique `code`
//! - **Backing file**: the full collection, rewritten on every mutation
//! - **Reload**: `add` and `list` re-read the file before acting
//!
//! ## Example
//!
//! ```no_run
//! use product_store::{ProductId, ProductInput, ProductStore, StoreConfig};
//! use serde_json::json;
//!
//! let store = ProductStore::open(StoreConfig::new("products.json"));
//!
//! store.add(ProductInput::new("Caramelo", "Arcor", 122, "", 12, 15))?;
//! store.add(ProductInput::new("Chicle", "Arcor", 22, "", 15, 18))?;
//!
//! let fields = json!({"title": "Turron", "price": 55});
//! store.update(ProductId(2), fields.as_object().unwrap())?;
//! store.delete(ProductId(1))?;
//!
//! assert_eq!(store.list().len(), 1);
//! # Ok::<(), product_store::StoreError>(())
//! ```

pub mod error;
pub mod file;
pub mod store;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use file::ProductFile;
pub use store::{ProductStore, StoreConfig};
pub use types::*;
