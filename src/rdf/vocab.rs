//! Namespaces and vocabulary terms of the clinical ontology.

use super::Iri;

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Domain ontology.
pub const MDX: &str = "https://w3id.org/hacid/onto/mdx/";
/// Data namespace concept identifiers are appended to.
pub const MDXD: &str = "https://w3id.org/hacid/mdx/data/";
pub const TOP: &str = "https://w3id.org/hacid/onto/top-level/";
pub const JDG: &str = "https://w3id.org/hacid/onto/core/judgement/";
pub const NAMING: &str = "https://w3id.org/hacid/onto/core/naming/";
pub const MI: &str = "https://w3id.org/hacid/onto/meta-inventory/";
pub const BIF: &str = "http://www.openlinksw.com/schemas/bif#";

/// Prefix table used for Turtle output and SPARQL prologues.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
    ("mdx", MDX),
    ("top", TOP),
    ("jdg", JDG),
    ("naming", NAMING),
    ("mi", MI),
];

macro_rules! vocab_term {
    ($name:ident, $ns:literal, $local:literal) => {
        pub fn $name() -> Iri {
            Iri::new_unchecked(concat!($ns, $local))
        }
    };
}

pub mod rdf {
    use super::Iri;
    vocab_term!(type_, "http://www.w3.org/1999/02/22-rdf-syntax-ns#", "type");
}

pub mod rdfs {
    use super::Iri;
    vocab_term!(label, "http://www.w3.org/2000/01/rdf-schema#", "label");
}

pub mod xsd {
    use super::Iri;
    vocab_term!(decimal, "http://www.w3.org/2001/XMLSchema#", "decimal");
}

pub mod mdx {
    use super::Iri;
    vocab_term!(broader, "https://w3id.org/hacid/onto/mdx/", "broader");
    vocab_term!(is_described_by, "https://w3id.org/hacid/onto/mdx/", "isDescribedBy");
    vocab_term!(fully_specified_name, "https://w3id.org/hacid/onto/mdx/", "fullySpecifiedName");
    vocab_term!(for_clinical_case, "https://w3id.org/hacid/onto/mdx/", "forClinicalCase");
    vocab_term!(has_judge, "https://w3id.org/hacid/onto/mdx/", "hasJudge");
}

pub mod top {
    use super::Iri;
    vocab_term!(value_class, "https://w3id.org/hacid/onto/top-level/", "Value");
    vocab_term!(agent, "https://w3id.org/hacid/onto/top-level/", "Agent");
    vocab_term!(has_value, "https://w3id.org/hacid/onto/top-level/", "hasValue");
    vocab_term!(value, "https://w3id.org/hacid/onto/top-level/", "value");
}

pub mod jdg {
    use super::Iri;
    vocab_term!(relevance_assignment, "https://w3id.org/hacid/onto/core/judgement/", "RelevanceAssignment");
    vocab_term!(relevance, "https://w3id.org/hacid/onto/core/judgement/", "Relevance");
    vocab_term!(is_judgement_on, "https://w3id.org/hacid/onto/core/judgement/", "isJudgementOn");
    vocab_term!(has_relevance, "https://w3id.org/hacid/onto/core/judgement/", "hasRelevance");
}
