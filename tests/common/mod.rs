#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use concept_linker::config::HttpConfig;
use concept_linker::errors::{LinkerError, Result};
use concept_linker::linking::{ConceptLinker, FallbackSearch, Normalizer};
use concept_linker::rdf::vocab::MDXD;
use concept_linker::sparql::{BindingValue, ResultSet, SparqlService};
use concept_linker::types::ConceptId;

pub fn id(s: &str) -> ConceptId {
    ConceptId::new(s).expect("valid concept id")
}

pub fn fast_http() -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        max_retries: 0,
        retry_backoff_ms: 1,
    }
}

// ---------------------------------------------------------------------------
// Triplestore fake
// ---------------------------------------------------------------------------

/// In-memory triplestore answering the queries issued by `KgClient` and
/// `LexicalLinker`, and applying INSERT DATA / DELETE updates per graph.
#[derive(Default)]
pub struct FakeTriplestore {
    /// (narrower, broader) pairs.
    pub broader: Vec<(String, String)>,
    /// Lowercased name -> concept ids carrying it.
    pub names: HashMap<String, Vec<String>>,
    /// Concept -> related concept IRIs as returned by the store.
    pub related: HashMap<String, Vec<String>>,
    pub fail_queries: bool,
    pub update_status: Option<u16>,
    pub queries: RefCell<Vec<String>>,
    pub updates: RefCell<Vec<String>>,
    pub graphs: RefCell<HashMap<String, BTreeSet<String>>>,
}

impl FakeTriplestore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broader(mut self, narrower: &str, broader: &str) -> Self {
        self.broader.push((narrower.to_string(), broader.to_string()));
        self
    }

    pub fn with_name(mut self, name: &str, concept: &str) -> Self {
        self.names
            .entry(name.to_lowercase())
            .or_default()
            .push(concept.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    /// Statements currently stored in `graph`.
    pub fn graph(&self, graph: &str) -> BTreeSet<String> {
        self.graphs.borrow().get(graph).cloned().unwrap_or_default()
    }

    pub fn last_query(&self) -> String {
        self.queries.borrow().last().cloned().unwrap_or_default()
    }

    fn uris(values: impl IntoIterator<Item = String>) -> Vec<BindingValue> {
        values.into_iter().map(BindingValue::uri).collect()
    }
}

/// First `<...>` after `marker`, without the angle brackets.
fn iri_after(text: &str, marker: &str) -> Option<String> {
    let rest = &text[text.find(marker)? + marker.len()..];
    let start = rest.find('<')? + 1;
    let end = rest[start..].find('>')? + start;
    Some(rest[start..end].to_string())
}

fn local(iri: &str) -> String {
    iri.strip_prefix(MDXD).unwrap_or(iri).to_string()
}

impl SparqlService for FakeTriplestore {
    fn query(&self, query: &str) -> Result<ResultSet> {
        self.queries.borrow_mut().push(query.to_string());
        if self.fail_queries {
            return Err(LinkerError::Transport {
                message: "connection refused".to_string(),
                url: "http://fake/sparql".to_string(),
            });
        }

        if query.contains("SELECT DISTINCT ?broader") {
            let concept = local(&iri_after(query, "WHERE {").unwrap_or_default());
            let values = self
                .broader
                .iter()
                .filter(|(n, _)| *n == concept)
                .map(|(_, b)| format!("{}{}", MDXD, b));
            return Ok(ResultSet::from_column("broader", Self::uris(values)));
        }

        if query.contains("SELECT DISTINCT ?narrower") {
            let concept = local(&iri_after(query, "mdx:broader").unwrap_or_default());
            let values = self
                .broader
                .iter()
                .filter(|(_, b)| *b == concept)
                .map(|(n, _)| format!("{}{}", MDXD, n));
            return Ok(ResultSet::from_column("narrower", Self::uris(values)));
        }

        if query.contains("SELECT DISTINCT ?otherEntity") {
            let concept = local(&iri_after(query, "WHERE {").unwrap_or_default());
            let values = self.related.get(&concept).cloned().unwrap_or_default();
            return Ok(ResultSet::from_column("otherEntity", Self::uris(values)));
        }

        if query.contains("SELECT DISTINCT ?concept") {
            let marker = "LCASE(STR(?name)) = \"";
            let start = query.find(marker).map(|i| i + marker.len()).unwrap_or(0);
            let end = query[start..].find('"').map(|i| i + start).unwrap_or(start);
            let name = &query[start..end];
            let values = self
                .names
                .get(name)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(|c| format!("{}{}", MDXD, c));
            return Ok(ResultSet::from_column("concept", Self::uris(values)));
        }

        if query.trim_start().starts_with("ASK") {
            let graph = iri_after(query, "GRAPH").unwrap_or_default();
            let non_empty = self
                .graphs
                .borrow()
                .get(&graph)
                .map(|g| !g.is_empty())
                .unwrap_or(false);
            return Ok(ResultSet::from_boolean(non_empty));
        }

        Ok(ResultSet::default())
    }

    fn update(&self, update: &str) -> Result<()> {
        self.updates.borrow_mut().push(update.to_string());
        if let Some(status) = self.update_status {
            return Err(LinkerError::UpdateFailed {
                status,
                body: String::new(),
            });
        }

        if update.starts_with("INSERT DATA") {
            let graph = iri_after(update, "GRAPH").unwrap_or_default();
            let mut graphs = self.graphs.borrow_mut();
            let stored = graphs.entry(graph).or_default();
            for line in update.lines().map(str::trim) {
                if line.starts_with('<') && line.ends_with(" .") {
                    stored.insert(line.to_string());
                }
            }
        } else if update.starts_with("WITH") {
            let graph = iri_after(update, "WITH").unwrap_or_default();
            self.graphs.borrow_mut().remove(&graph);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Linking fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeNormalizer {
    pub forms: HashMap<String, Vec<String>>,
    pub fail: bool,
}

impl FakeNormalizer {
    pub fn with(mut self, term: &str, forms: &[&str]) -> Self {
        self.forms.insert(
            term.to_string(),
            forms.iter().map(|f| f.to_string()).collect(),
        );
        self
    }
}

impl Normalizer for FakeNormalizer {
    fn normalize(&self, term: &str) -> Result<Vec<String>> {
        if self.fail {
            return Err(LinkerError::Normalization {
                message: "connection refused".to_string(),
                term: term.to_string(),
            });
        }
        Ok(self.forms.get(term).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeLinker {
    pub links: HashMap<String, String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeLinker {
    pub fn with(mut self, form: &str, concept: &str) -> Self {
        self.links.insert(form.to_string(), concept.to_string());
        self
    }
}

impl ConceptLinker for FakeLinker {
    fn link(&self, normalized_form: &str) -> Option<ConceptId> {
        self.calls.borrow_mut().push(normalized_form.to_string());
        self.links.get(normalized_form).map(|c| id(c))
    }
}

/// Fallback answering with a fixed id or a fixed status error.
pub struct FakeFallback {
    pub answer: std::result::Result<String, u16>,
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl FakeFallback {
    pub fn ok(concept: &str) -> Self {
        Self {
            answer: Ok(concept.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            answer: Err(status),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FallbackSearch for FakeFallback {
    fn search(&self, normalized_forms: &[String]) -> Result<ConceptId> {
        self.calls.borrow_mut().push(normalized_forms.to_vec());
        match &self.answer {
            Ok(c) => Ok(id(c)),
            Err(status) => Err(LinkerError::EmbeddingSearch {
                status: *status,
                query: normalized_forms.join(" | "),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot HTTP responder
// ---------------------------------------------------------------------------

/// Accepts a single connection, records the raw request and answers with a
/// canned response.
pub struct CannedServer {
    pub url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    pub fn start(status_line: &str, content_type: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let response = http_response(status_line, content_type, body);
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept connection");
            let request = read_request(&mut stream);
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            stream.flush().expect("flush response");
            request
        });
        Self {
            url: format!("http://{}", addr),
            handle,
        }
    }

    /// The raw request received, headers and body.
    pub fn request(self) -> String {
        self.handle.join().expect("server thread")
    }
}

/// Raw HTTP/1.1 response text with `Connection: close`.
pub fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
    if status_line.starts_with("204") {
        format!("HTTP/1.1 {}\r\nConnection: close\r\n\r\n", status_line)
    } else {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        )
    }
}

// ---------------------------------------------------------------------------
// Multi-connection HTTP responder
// ---------------------------------------------------------------------------

/// Serves one connection per script step, in order.
///
/// `Some(response)` answers with the raw response text; `None` reads the
/// request and closes the connection without answering. The server stops
/// after the last step, or once no new connection arrives within `idle`.
pub struct ScriptedServer {
    pub url: String,
    handle: JoinHandle<Vec<String>>,
}

impl ScriptedServer {
    pub fn start(script: Vec<Option<String>>, idle: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        listener
            .set_nonblocking(true)
            .expect("non-blocking listener");
        let handle = thread::spawn(move || {
            let mut requests = Vec::new();
            for step in script {
                let deadline = Instant::now() + idle;
                let accepted = loop {
                    match listener.accept() {
                        Ok((stream, _)) => break Some(stream),
                        Err(e)
                            if e.kind() == io::ErrorKind::WouldBlock
                                && Instant::now() < deadline =>
                        {
                            thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break None,
                    }
                };
                let Some(mut stream) = accepted else {
                    break;
                };
                stream.set_nonblocking(false).expect("blocking stream");
                requests.push(read_request(&mut stream));
                if let Some(response) = step {
                    stream
                        .write_all(response.as_bytes())
                        .expect("write response");
                    stream.flush().expect("flush response");
                }
            }
            requests
        });
        Self {
            url: format!("http://{}", addr),
            handle,
        }
    }

    /// Raw requests received, one per accepted connection.
    pub fn requests(self) -> Vec<String> {
        self.handle.join().expect("server thread")
    }
}

fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).expect("read request");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}
