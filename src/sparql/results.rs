//! SPARQL 1.1 Query Results JSON Format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One bound value in a solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValue {
    /// `uri`, `literal`, `typed-literal` or `bnode`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl BindingValue {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solutions {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, BindingValue>>,
}

/// A complete query result: SELECT solutions or an ASK boolean.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub head: ResultHead,
    #[serde(default)]
    pub results: Solutions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean: Option<bool>,
}

impl ResultSet {
    /// A single-variable SELECT result.
    pub fn from_column(var: &str, values: impl IntoIterator<Item = BindingValue>) -> Self {
        let bindings = values
            .into_iter()
            .map(|v| {
                let mut row = HashMap::new();
                row.insert(var.to_string(), v);
                row
            })
            .collect();
        Self {
            head: ResultHead {
                vars: vec![var.to_string()],
            },
            results: Solutions { bindings },
            boolean: None,
        }
    }

    /// An ASK result.
    pub fn from_boolean(value: bool) -> Self {
        Self {
            boolean: Some(value),
            ..Self::default()
        }
    }

    /// Values bound to `var`, in solution order. Unbound rows are skipped.
    pub fn values<'a>(&'a self, var: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.results
            .bindings
            .iter()
            .filter_map(move |row| row.get(var).map(|b| b.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.results.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}
