//! Document filters
//!
//! Scope queries arrive from the host as flat field-to-value equality maps.
//! A [`Filter`] is a conjunction of per-field conditions over scalar JSON
//! values, compiled to fully parameterized `json_extract` clauses.
//!
//! Comparisons use SQL `IS` / `IS NOT`, so an equality against `null`
//! matches records missing the field, and a [`Condition::Ne`] matches
//! records that never had the field at all. The deletion sweep depends on
//! the latter to retire records predating the `Timestamp` marker.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A single per-field condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value (or is absent, when the value is null)
    Eq(Value),
    /// Field differs from the value, including when the field is absent
    Ne(Value),
}

/// Conjunction of per-field conditions over scalar values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    /// An empty filter matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an equality filter from a flat scope query.
    pub fn from_query(query: &Map<String, Value>) -> Result<Self> {
        let mut filter = Self::new();
        for (field, value) in query {
            if !is_scalar(value) {
                return Err(Error::UnsupportedFilter(field.clone()));
            }
            filter = filter.and_eq(field.clone(), value.clone());
        }
        Ok(filter)
    }

    /// Add an equality condition
    #[must_use]
    pub fn and_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value)));
        self
    }

    /// Add an inequality condition
    #[must_use]
    pub fn and_ne(mut self, field: impl Into<String>, value: Value) -> Self {
        self.clauses.push((field.into(), Condition::Ne(value)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Compile to a `WHERE` clause and its positional parameters.
    ///
    /// Returns an empty clause for an empty filter. Field paths and values
    /// are bound as parameters, never spliced into the SQL text.
    pub(crate) fn to_sql(&self) -> Result<(String, Vec<libsql::Value>)> {
        if self.clauses.is_empty() {
            return Ok((String::new(), Vec::new()));
        }

        let mut terms = Vec::with_capacity(self.clauses.len());
        let mut params = Vec::with_capacity(self.clauses.len() * 2);
        for (field, condition) in &self.clauses {
            let (operator, value) = match condition {
                Condition::Eq(value) => ("IS", value),
                Condition::Ne(value) => ("IS NOT", value),
            };
            terms.push(format!("json_extract(doc, ?) {operator} ?"));
            params.push(libsql::Value::Text(json_path(field)?));
            params.push(scalar_param(field, value)?);
        }

        Ok((format!("WHERE {}", terms.join(" AND ")), params))
    }
}

/// JSON path addressing a top-level document field.
pub(crate) fn json_path(field: &str) -> Result<String> {
    if field.is_empty() || field.contains('"') {
        return Err(Error::UnsupportedField(field.to_string()));
    }
    Ok(format!("$.\"{field}\""))
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_param(field: &str, value: &Value) -> Result<libsql::Value> {
    match value {
        Value::Null => Ok(libsql::Value::Null),
        Value::Bool(flag) => Ok(libsql::Value::Integer(i64::from(*flag))),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(libsql::Value::Integer(integer))
            } else if let Some(real) = number.as_f64() {
                Ok(libsql::Value::Real(real))
            } else {
                Err(Error::UnsupportedFilter(field.to_string()))
            }
        }
        Value::String(text) => Ok(libsql::Value::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => Err(Error::UnsupportedFilter(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_filter_compiles_to_no_clause() {
        let (sql, params) = Filter::new().to_sql().unwrap();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn conditions_compile_in_order() {
        let filter = Filter::new()
            .and_eq("Region", json!("eu-1"))
            .and_ne("Timestamp", json!(7));
        let (sql, params) = filter.to_sql().unwrap();

        assert_eq!(
            sql,
            "WHERE json_extract(doc, ?) IS ? AND json_extract(doc, ?) IS NOT ?"
        );
        assert_eq!(
            params,
            vec![
                libsql::Value::Text("$.\"Region\"".to_string()),
                libsql::Value::Text("eu-1".to_string()),
                libsql::Value::Text("$.\"Timestamp\"".to_string()),
                libsql::Value::Integer(7),
            ]
        );
    }

    #[test]
    fn from_query_keeps_all_equality_pairs() {
        let query = json!({"Region": "eu-1", "Kind": "vm"});
        let filter = Filter::from_query(query.as_object().unwrap()).unwrap();
        assert_eq!(filter.clauses.len(), 2);
    }

    #[test]
    fn from_query_rejects_nested_values() {
        let query = json!({"Region": {"$in": ["eu-1"]}});
        let error = Filter::from_query(query.as_object().unwrap()).unwrap_err();
        assert!(matches!(error, Error::UnsupportedFilter(field) if field == "Region"));
    }

    #[test]
    fn scalar_values_map_to_sql_types() {
        let filter = Filter::new()
            .and_eq("A", json!(null))
            .and_eq("B", json!(true))
            .and_eq("C", json!(2.5));
        let (_, params) = filter.to_sql().unwrap();
        assert_eq!(
            vec![params[1].clone(), params[3].clone(), params[5].clone()],
            vec![
                libsql::Value::Null,
                libsql::Value::Integer(1),
                libsql::Value::Real(2.5),
            ]
        );
    }

    #[test]
    fn field_names_with_quotes_are_rejected() {
        let filter = Filter::new().and_eq("bad\"field", json!(1));
        assert!(matches!(
            filter.to_sql().unwrap_err(),
            Error::UnsupportedField(_)
        ));
    }
}
