//! Parameterized SPARQL construction.
//!
//! Query text is written as a template with `%{name}` placeholders. Values are
//! bound with a type that decides how they are rendered, and rendering fails
//! if any placeholder is left unbound. Caller-supplied text never reaches the
//! query without passing through one of these renderers.

use std::collections::HashMap;

use crate::errors::{LinkerError, Result};
use crate::rdf::{Iri, Literal};
use crate::rdf::vocab::PREFIXES;

/// A value bound to a template placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Rendered as `<iri>`.
    Iri(Iri),
    /// Rendered as a double-quoted, escaped string literal.
    Literal(String),
    /// Rendered as a Virtuoso free-text phrase, `"'words'"`.
    FreeTextPhrase(String),
}

impl Param {
    fn render(&self) -> String {
        match self {
            Param::Iri(iri) => iri.to_string(),
            Param::Literal(value) => Literal::new_simple_literal(value.as_str()).to_string(),
            Param::FreeTextPhrase(value) => {
                // Quotes would terminate the phrase inside the text index syntax.
                let words: String = value
                    .chars()
                    .map(|c| if matches!(c, '\'' | '"' | '\\') { ' ' } else { c })
                    .collect();
                let words = words.split_whitespace().collect::<Vec<_>>().join(" ");
                format!("\"'{}'\"", words)
            }
        }
    }
}

/// A SPARQL template with named placeholders.
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    prefixes: Vec<(String, String)>,
    body: String,
    params: HashMap<String, Param>,
}

impl QueryTemplate {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            prefixes: Vec::new(),
            body: body.into(),
            params: HashMap::new(),
        }
    }

    /// Declares `PREFIX name: <namespace>` in the prologue.
    pub fn prefix(mut self, name: &str, namespace: &str) -> Self {
        self.prefixes.push((name.to_string(), namespace.to_string()));
        self
    }

    /// Declares the standard vocabulary prefixes named in `names`.
    pub fn standard_prefixes(mut self, names: &[&str]) -> Self {
        for (name, ns) in PREFIXES {
            if names.contains(name) {
                self.prefixes.push((name.to_string(), ns.to_string()));
            }
        }
        self
    }

    pub fn bind(mut self, name: &str, param: Param) -> Self {
        self.params.insert(name.to_string(), param);
        self
    }

    pub fn bind_iri(self, name: &str, iri: Iri) -> Self {
        self.bind(name, Param::Iri(iri))
    }

    pub fn bind_literal(self, name: &str, value: impl Into<String>) -> Self {
        self.bind(name, Param::Literal(value.into()))
    }

    /// Renders the final query text.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for (name, ns) in &self.prefixes {
            out.push_str(&format!("PREFIX {}: <{}>\n", name, ns));
        }

        let mut rest = self.body.as_str();
        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| LinkerError::InvalidTerm {
                message: "unterminated placeholder in query template".to_string(),
            })?;
            let name = &after[..end];
            let param = self.params.get(name).ok_or_else(|| LinkerError::InvalidTerm {
                message: format!("unbound query placeholder '{}'", name),
            })?;
            out.push_str(&param.render());
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
