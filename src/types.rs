//! Core types for the product store.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a product.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl ProductId {
    /// The following id, or `None` once ids are exhausted.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(ProductId)
    }
}

impl fmt::Debug for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProductId({})", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

/// A stored field value.
///
/// Values accepted through `add` and `update` are always text or numbers.
/// Records loaded from disk may carry anything else a writer put there
/// (`null`, booleans, nested data); those are kept as [`FieldValue::Other`]
/// and written back unchanged.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(Number),
    Text(String),
    Other(Value),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Other(Value::Null)
    }
}

impl FieldValue {
    /// Convert a JSON value, rejecting anything that is not a string or a number.
    pub fn from_json(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(FieldValue::Text(s)),
            Value::Number(n) => Ok(FieldValue::Number(n)),
            _ => Err(StoreError::Validation {
                field: field.to_string(),
                expected: "string or number",
            }),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FieldValue::Text(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, FieldValue::Number(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Other(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

// Numbers compare by value so that `12` and `12.0` are the same code.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::Number(a), FieldValue::Number(b)) => numbers_equal(a, b),
            (FieldValue::Other(a), FieldValue::Other(b)) => a == b,
            _ => false,
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    a.as_f64() == b.as_f64()
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

/// A single product in the store.
///
/// Field order matches the on-disk layout: the descriptive fields first, then
/// `id`, then any extra keys merged in by updates. A named field missing from
/// the file loads as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub title: FieldValue,
    #[serde(default)]
    pub description: FieldValue,
    #[serde(default)]
    pub price: FieldValue,
    #[serde(default)]
    pub thumbnail: FieldValue,
    #[serde(default)]
    pub code: FieldValue,
    #[serde(default)]
    pub stock: FieldValue,

    /// Unique identifier (assigned by store).
    pub id: ProductId,

    /// Keys outside the named fields, added through updates or by other writers.
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl Product {
    /// Look up a field by name. `id` is not a field value; use [`Product::id`].
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match name {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "price" => Some(&self.price),
            "thumbnail" => Some(&self.thumbnail),
            "code" => Some(&self.code),
            "stock" => Some(&self.stock),
            other => self.extra.get(other),
        }
    }

    /// Overwrite a field. Callers must have rejected `id` already.
    pub(crate) fn set_field(&mut self, name: &str, value: FieldValue) {
        match name {
            "title" => self.title = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "thumbnail" => self.thumbnail = value,
            "code" => self.code = value,
            "stock" => self.stock = value,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }
}

/// Partial update payload: field name to new value.
pub type UpdateFields = Map<String, Value>;

/// Input for adding a product. Values are unchecked until the store validates them.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductInput {
    pub title: Value,
    pub description: Value,
    pub price: Value,
    pub thumbnail: Value,
    pub code: Value,
    pub stock: Value,
}

impl ProductInput {
    pub fn new(
        title: impl Into<Value>,
        description: impl Into<Value>,
        price: impl Into<Value>,
        thumbnail: impl Into<Value>,
        code: impl Into<Value>,
        stock: impl Into<Value>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            price: price.into(),
            thumbnail: thumbnail.into(),
            code: code.into(),
            stock: stock.into(),
        }
    }

    /// Build input from a JSON object. Missing keys become `null` and fail validation.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(StoreError::Validation {
                field: "product".to_string(),
                expected: "object",
            });
        };
        let mut take = |key: &str| map.remove(key).unwrap_or(Value::Null);
        Ok(Self {
            title: take("title"),
            description: take("description"),
            price: take("price"),
            thumbnail: take("thumbnail"),
            code: take("code"),
            stock: take("stock"),
        })
    }

    /// Check every field against its declared kind.
    pub(crate) fn validate(self) -> Result<NewProduct> {
        Ok(NewProduct {
            title: text("title", self.title)?,
            description: text("description", self.description)?,
            price: number("price", self.price)?,
            thumbnail: text("thumbnail", self.thumbnail)?,
            code: number("code", self.code)?,
            stock: number("stock", self.stock)?,
        })
    }
}

fn text(field: &str, value: Value) -> Result<FieldValue> {
    match value {
        Value::String(s) => Ok(FieldValue::Text(s)),
        _ => Err(StoreError::Validation {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

fn number(field: &str, value: Value) -> Result<FieldValue> {
    match value {
        Value::Number(n) => Ok(FieldValue::Number(n)),
        _ => Err(StoreError::Validation {
            field: field.to_string(),
            expected: "number",
        }),
    }
}

/// Validated product fields awaiting an id.
#[derive(Clone, Debug)]
pub(crate) struct NewProduct {
    title: FieldValue,
    description: FieldValue,
    price: FieldValue,
    thumbnail: FieldValue,
    pub(crate) code: FieldValue,
    stock: FieldValue,
}

impl NewProduct {
    pub(crate) fn with_id(self, id: ProductId) -> Product {
        Product {
            title: self.title,
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            code: self.code,
            stock: self.stock,
            id,
            extra: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        let int = FieldValue::from_json("code", json!(12)).unwrap();
        let float = FieldValue::from_json("code", json!(12.0)).unwrap();
        assert_eq!(int, float);
        assert_ne!(int, FieldValue::from("12"));

        // Integers beyond f64 precision stay distinct
        let big = 1i64 << 60;
        assert_ne!(FieldValue::from(big), FieldValue::from(big + 1));
    }

    #[test]
    fn test_field_value_rejects_other_kinds() {
        for value in [json!(null), json!(true), json!([1]), json!({"a": 1})] {
            let result = FieldValue::from_json("price", value);
            assert!(matches!(result, Err(StoreError::Validation { .. })));
        }
    }

    #[test]
    fn test_validate_reports_first_bad_field() {
        let input = ProductInput::new("Caramelo", "Arcor", "122", "", 12, 15);
        match input.validate() {
            Err(StoreError::Validation { field, expected }) => {
                assert_eq!(field, "price");
                assert_eq!(expected, "number");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_nan_price_is_not_a_number() {
        let input = ProductInput::new("Caramelo", "Arcor", f64::NAN, "", 12, 15);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_from_json_missing_key() {
        let input = ProductInput::from_json(json!({
            "title": "Chicle",
            "description": "Arcor",
            "price": 22,
            "code": 15,
            "stock": 18
        }))
        .unwrap();
        assert_eq!(input.thumbnail, Value::Null);
        assert!(input.validate().is_err());

        assert!(ProductInput::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_product_json_layout() {
        let mut product = ProductInput::new("Chicle", "Arcor", 22, "", 15, 18)
            .validate()
            .unwrap()
            .with_id(ProductId(2));
        product.set_field("color", FieldValue::from("rosa"));

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Chicle",
                "description": "Arcor",
                "price": 22,
                "thumbnail": "",
                "code": 15,
                "stock": 18,
                "id": 2,
                "color": "rosa"
            })
        );

        let parsed: Product = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, product);
        assert_eq!(parsed.field("color"), Some(&FieldValue::from("rosa")));
    }

    #[test]
    fn test_product_loads_loose_fields() {
        let product: Product = serde_json::from_value(json!({
            "title": "Chicle",
            "price": 22,
            "thumbnail": null,
            "code": 15,
            "id": 2,
            "tags": ["dulce"]
        }))
        .unwrap();

        assert!(product.description.is_null());
        assert!(product.thumbnail.is_null());
        assert!(product.stock.is_null());
        assert_eq!(product.field("tags"), Some(&FieldValue::Other(json!(["dulce"]))));

        // Loose values still reject as input
        assert!(FieldValue::from_json("thumbnail", json!(null)).is_err());
    }

    #[test]
    fn test_set_field_allows_kind_change() {
        let mut product = ProductInput::new("Chicle", "Arcor", 22, "", 15, 18)
            .validate()
            .unwrap()
            .with_id(ProductId(1));
        product.set_field("title", FieldValue::from(7));
        assert!(product.title.is_number());
        assert_eq!(product.title.as_f64(), Some(7.0));
    }
}
