/// Knowledge-graph client: queries, traversal and updates.
pub mod client;

/// Parameterized query templates.
pub mod builder;

/// SPARQL JSON result documents.
pub mod results;

/// Transport seam between the client and a triplestore.
pub mod service;

pub use builder::{Param, QueryTemplate};
pub use client::KgClient;
pub use results::{BindingValue, ResultSet};
pub use service::{HttpSparqlService, SparqlService};
