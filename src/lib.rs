pub mod annotation;
pub mod config;
pub mod errors;
pub mod http;
pub mod identity;
pub mod linking;
pub mod rdf;
pub mod sparql;
pub mod types;
