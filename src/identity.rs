use sha2::{Digest, Sha256};

use crate::errors::{LinkerError, Result};

/// Compute the SHA-256 content hash of a string, hex encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Renders a relevance score the way it appears in IRIs and labels.
///
/// The result is a plain `xsd:decimal` lexical form: never an exponent, and
/// integral scores keep a trailing `.0` (`1.0`, not `1`) so that the same
/// score always maps to the same node. Non-finite scores are rejected.
pub fn format_score(score: f64) -> Result<String> {
    if !score.is_finite() {
        return Err(LinkerError::InvalidTerm {
            message: format!("relevance score must be finite, got {}", score),
        });
    }
    let mut rendered = score.to_string();
    if !rendered.contains('.') {
        rendered.push_str(".0");
    }
    Ok(rendered)
}

/// Identifier of a relevance assignment: a digest of `case-concept-score`.
pub fn assignment_id(case_reference: &str, concept_id: &str, score: &str) -> String {
    content_hash(&format!("{}-{}-{}", case_reference, concept_id, score))
}

/// Lowercase ASCII slug of a method name.
///
/// Non-ASCII letters are transliterated (`Prüfung` becomes `prufung`) and
/// runs of other characters collapse to `-`. A name that transliterates to
/// nothing slugs to a short digest of the name, so distinct methods never
/// share an empty slug.
pub fn slugify(name: &str) -> String {
    let slugged = slug::slugify(name);
    if slugged.is_empty() {
        return content_hash(name)[..12].to_string();
    }
    slugged
}
