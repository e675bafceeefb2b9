//! Document store layer for Census

mod collection;
mod connection;
mod filter;

pub use collection::Collection;
pub use connection::Store;
pub use filter::{Condition, Filter};

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// A schemaless stored document: field name to JSON value
pub type Document = Map<String, Value>;

/// Serialize a value into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde_json::Error::custom(format!("expected a JSON object, got {other}")).into()),
    }
}

/// Deserialize a document into a typed value.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
