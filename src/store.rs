//! Main store struct: the in-memory product collection bound to its file.

use crate::error::{Result, StoreError};
use crate::file::ProductFile;
use crate::types::{FieldValue, Product, ProductId, ProductInput, UpdateFields};
use parking_lot::Mutex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the backing JSON file.
    pub path: PathBuf,

    /// Start the id counter after the highest id already on disk instead of at 1.
    pub resume_ids: bool,

    /// Return write failures to the caller instead of only logging them.
    pub strict_persistence: bool,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./products.json"),
            resume_ids: false,
            strict_persistence: false,
        }
    }
}

/// Mutable state guarded by the store lock.
struct Inventory {
    products: Vec<Product>,
    next_id: ProductId,
}

/// A product collection persisted to a single file.
///
/// Every operation holds the store lock for its whole duration, including file
/// I/O, so operations on one store never interleave. Nothing guards the file
/// against other stores or processes writing it.
pub struct ProductStore {
    config: StoreConfig,
    file: ProductFile,
    inventory: Mutex<Inventory>,
}

impl ProductStore {
    /// Open a store bound to `config.path`, loading whatever the file holds.
    pub fn open(config: StoreConfig) -> Self {
        let file = ProductFile::new(&config.path);
        let store = Self {
            config,
            file,
            inventory: Mutex::new(Inventory {
                products: Vec::new(),
                next_id: ProductId(1),
            }),
        };

        {
            let mut inv = store.inventory.lock();
            store.reload(&mut inv);
            if store.config.resume_ids {
                if let Some(max) = inv.products.iter().map(|p| p.id).max() {
                    match max.checked_next() {
                        Some(next) => inv.next_id = next,
                        None => warn!(max = %max, "Highest id on disk leaves no room, ids restart at 1"),
                    }
                }
            }
        }

        store
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The id the next successful add will assign.
    pub fn next_id(&self) -> ProductId {
        self.inventory.lock().next_id
    }

    // --- Operations ---

    /// Add a product, assigning it the next id.
    ///
    /// The code is checked against the in-memory collection, then again after
    /// reloading from disk, so a code written by someone else in between is
    /// still caught.
    pub fn add(&self, input: ProductInput) -> Result<Product> {
        let mut inv = self.inventory.lock();

        if let Ok(code) = FieldValue::from_json("code", input.code.clone()) {
            ensure_unique_code(&inv.products, &code)?;
        }

        let new_product = input.validate()?;

        self.reload(&mut inv);
        ensure_unique_code(&inv.products, &new_product.code)?;

        let id = inv.next_id;
        inv.next_id = id.checked_next().ok_or(StoreError::IdsExhausted)?;

        let product = new_product.with_id(id);
        inv.products.push(product.clone());
        info!(id = %id, code = %product.code, "Added product");

        self.persist(&inv.products)?;
        Ok(product)
    }

    /// All products, freshly read from disk.
    pub fn list(&self) -> Vec<Product> {
        let mut inv = self.inventory.lock();
        self.reload(&mut inv);
        inv.products.clone()
    }

    /// Look up a product in memory without touching the file.
    pub fn get_by_id(&self, id: ProductId) -> Option<Product> {
        let inv = self.inventory.lock();
        let found = inv.products.iter().find(|p| p.id == id).cloned();
        if found.is_none() {
            warn!(id = %id, "Product not found");
        }
        found
    }

    /// Merge `fields` over the product with the given id and persist.
    pub fn update(&self, id: ProductId, fields: &UpdateFields) -> Result<Product> {
        let mut inv = self.inventory.lock();

        let index = position(&inv.products, id)?;

        if fields.contains_key("id") {
            return Err(StoreError::ImmutableField("id".to_string()));
        }

        let mut changes = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            changes.push((key.as_str(), FieldValue::from_json(key, value.clone())?));
        }

        let product = &mut inv.products[index];
        for (key, value) in changes {
            product.set_field(key, value);
        }
        let updated = product.clone();
        info!(id = %id, fields = fields.len(), "Updated product");

        self.persist(&inv.products)?;
        Ok(updated)
    }

    /// Remove the product with the given id and persist.
    pub fn delete(&self, id: ProductId) -> Result<Product> {
        let mut inv = self.inventory.lock();

        let index = position(&inv.products, id)?;
        let removed = inv.products.remove(index);
        info!(id = %id, "Deleted product");

        self.persist(&inv.products)?;
        Ok(removed)
    }

    // --- File synchronization ---

    /// Replace the in-memory collection with the file contents. A missing or
    /// unreadable file leaves the collection empty.
    fn reload(&self, inv: &mut Inventory) {
        match self.file.load() {
            Ok(products) => {
                debug!(path = ?self.file.path(), count = products.len(), "Loaded products");
                inv.products = products;
            }
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.file.path(), "No product file yet, starting empty");
                inv.products = Vec::new();
            }
            Err(e) => {
                warn!(path = ?self.file.path(), "Failed to load products, starting empty: {}", e);
                inv.products = Vec::new();
            }
        }
    }

    /// Write the collection to the file. Failures are logged, and only
    /// returned in strict mode; the in-memory state is kept either way.
    fn persist(&self, products: &[Product]) -> Result<()> {
        if let Err(e) = self.file.save(products) {
            error!(path = ?self.file.path(), "Failed to save products: {}", e);
            if self.config.strict_persistence {
                return Err(StoreError::Persistence(e.to_string()));
            }
        }
        Ok(())
    }
}

fn ensure_unique_code(products: &[Product], code: &FieldValue) -> Result<()> {
    if products.iter().any(|p| &p.code == code) {
        return Err(StoreError::DuplicateCode(code.clone()));
    }
    Ok(())
}

fn position(products: &[Product], id: ProductId) -> Result<usize> {
    products
        .iter()
        .position(|p| p.id == id)
        .ok_or(StoreError::NotFound(id))
}
