//! Minimal HTTP/1.1 registry for integration tests.
//!
//! Serves `/v2/`, `/v2/_catalog`, `/v2/<repo>/tags/list` and
//! `/v2/<repo>/manifests/<ref>` from an in-memory fixture. List endpoints
//! honour `n`/`last` and announce the next page with a `Link` header, like a
//! real registry does. Manifest GETs answer schema 2 when the `Accept` header
//! asks for it and schema 1 otherwise; PUTs are recorded.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
const MANIFEST_V1: &str = "application/vnd.docker.distribution.manifest.v1+prettyjws";

#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub repositories: Vec<String>,
    pub tags: HashMap<String, Vec<String>>,
    /// Tags whose manifest lookup answers 500.
    pub broken_tags: HashSet<String>,
    /// Repositories whose tag list answers 500.
    pub broken_repositories: HashSet<String>,
}

impl Fixture {
    pub fn with_repository(mut self, name: &str, tags: &[&str]) -> Self {
        self.repositories.push(name.to_string());
        self.tags
            .insert(name.to_string(), tags.iter().map(|t| t.to_string()).collect());
        self
    }
}

/// Manifest received through a PUT.
#[derive(Debug, Clone, PartialEq)]
pub struct Pushed {
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct State {
    requests: Mutex<Vec<String>>,
    pushed: Mutex<HashMap<(String, String), Pushed>>,
}

pub struct Registry {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    state: Arc<State>,
}

impl Registry {
    /// Request lines seen so far ("GET /v2/_catalog?n=2").
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn pushed(&self, repository: &str, reference: &str) -> Option<Pushed> {
        self.state
            .pushed
            .lock()
            .unwrap()
            .get(&(repository.to_string(), reference.to_string()))
            .cloned()
    }
}

/// Starts the registry in a background thread. It runs until the process exits.
pub fn start(fixture: Fixture) -> Registry {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let fixture = Arc::new(fixture);
    let state = Arc::new(State::default());
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let fixture = Arc::clone(&fixture);
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &fixture, &state));
        }
    });
    Registry {
        url: format!("http://127.0.0.1:{}/", port),
        state,
    }
}

struct Request {
    method: String,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Request {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Reply {
    status: &'static str,
    content_type: &'static str,
    headers: Vec<String>,
    body: String,
}

impl Reply {
    fn json(body: String) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            headers: Vec::new(),
            body,
        }
    }

    fn empty(status: &'static str) -> Self {
        Self {
            status,
            content_type: "application/json",
            headers: Vec::new(),
            body: String::new(),
        }
    }

    fn error(status: &'static str) -> Self {
        Self {
            body: r#"{"errors":[{"code":"UNKNOWN"}]}"#.to_string(),
            ..Self::empty(status)
        }
    }
}

/// Reads the head, then exactly `Content-Length` bytes of body.
fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    };
    let head = std::str::from_utf8(&data[..head_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let target = first.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < head_end + length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    let end = data.len().min(head_end + length);
    Some(Request {
        method,
        target,
        headers,
        body: data[head_end..end].to_vec(),
    })
}

fn handle(mut stream: TcpStream, fixture: &Fixture, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {}", request.method, request.target));

    let reply = route(&request, fixture, state);
    let mut response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    for header in &reply.headers {
        response.push_str(header);
        response.push_str("\r\n");
    }
    response.push_str("\r\n");
    response.push_str(&reply.body);
    let _ = stream.write_all(response.as_bytes());
}

fn route(request: &Request, fixture: &Fixture, state: &State) -> Reply {
    let url = match url::Url::parse(&format!("http://registry.test{}", request.target)) {
        Ok(u) => u,
        Err(_) => return Reply::error("400 Bad Request"),
    };
    let path = url.path().to_string();
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

    if path == "/v2/" {
        return Reply::json("{}".to_string());
    }
    if path == "/v2/_catalog" {
        let (items, link) = paginate(&path, &fixture.repositories, &query);
        let mut reply = Reply::json(format!(r#"{{"repositories":{}}}"#, json_list(&items)));
        reply.headers.extend(link);
        return reply;
    }
    let Some(rest) = path.strip_prefix("/v2/") else {
        return Reply::error("404 Not Found");
    };
    if let Some(repo) = rest.strip_suffix("/tags/list") {
        if fixture.broken_repositories.contains(repo) {
            return Reply::error("500 Internal Server Error");
        }
        let Some(tags) = fixture.tags.get(repo) else {
            return Reply::error("404 Not Found");
        };
        if tags.is_empty() {
            return Reply::json(format!(r#"{{"name":"{repo}","tags":null}}"#));
        }
        let (items, link) = paginate(&path, tags, &query);
        let mut reply = Reply::json(format!(r#"{{"name":"{repo}","tags":{}}}"#, json_list(&items)));
        reply.headers.extend(link);
        return reply;
    }
    if let Some((repo, reference)) = rest.split_once("/manifests/") {
        return manifest(request, repo, reference, fixture, state);
    }
    Reply::error("404 Not Found")
}

fn manifest(request: &Request, repo: &str, reference: &str, fixture: &Fixture, state: &State) -> Reply {
    match request.method.as_str() {
        "DELETE" => {
            if reference.starts_with("sha256:") && fixture.tags.contains_key(repo) {
                return Reply::empty("202 Accepted");
            }
            return Reply::error("404 Not Found");
        }
        "PUT" => {
            if !fixture.tags.contains_key(repo) {
                return Reply::error("404 Not Found");
            }
            let pushed = Pushed {
                content_type: request.header("content-type").unwrap_or("").to_string(),
                body: request.body.clone(),
            };
            state
                .pushed
                .lock()
                .unwrap()
                .insert((repo.to_string(), reference.to_string()), pushed);
            let mut reply = Reply::empty("201 Created");
            reply
                .headers
                .push(format!("Docker-Content-Digest: sha256:pushed-{reference}"));
            return reply;
        }
        _ => {}
    }
    if fixture.broken_tags.contains(reference) {
        return Reply::error("500 Internal Server Error");
    }
    let known = fixture
        .tags
        .get(repo)
        .is_some_and(|tags| tags.iter().any(|t| t == reference));
    if !known {
        return Reply::error("404 Not Found");
    }
    let wants_v2 = request
        .header("accept")
        .is_some_and(|accept| accept.contains(MANIFEST_V2));
    if wants_v2 {
        let mut reply = Reply::json(v2_manifest(reference));
        reply.content_type = MANIFEST_V2;
        reply
            .headers
            .push(format!("Docker-Content-Digest: sha256:man-{reference}"));
        reply
    } else {
        let mut reply = Reply::json(v1_manifest(repo, reference));
        reply.content_type = MANIFEST_V1;
        reply
    }
}

/// Schema 2 manifest: config `sha256:cfg-<tag>`, two layers totalling 1234 bytes.
pub fn v2_manifest(reference: &str) -> String {
    format!(
        r#"{{"schemaVersion":2,"mediaType":"{MANIFEST_V2}","config":{{"mediaType":"application/vnd.docker.container.image.v1+json","size":1469,"digest":"sha256:cfg-{reference}"}},"layers":[{{"size":1000,"digest":"sha256:l1"}},{{"size":234,"digest":"sha256:l2"}}]}}"#
    )
}

/// Schema 1 manifest: linux/amd64, two history entries, newest first.
fn v1_manifest(repo: &str, reference: &str) -> String {
    let top = serde_json::json!({
        "id": format!("top-{reference}"),
        "os": "linux",
        "created": "2024-05-01T10:00:00Z",
        "container_config": { "Cmd": ["/bin/sh", "-c", format!("echo {reference}")] },
    });
    let base = serde_json::json!({
        "id": "base",
        "created": "2024-04-01T09:00:00Z",
    });
    serde_json::json!({
        "schemaVersion": 1,
        "name": repo,
        "tag": reference,
        "architecture": "amd64",
        "history": [
            { "v1Compatibility": top.to_string() },
            { "v1Compatibility": base.to_string() },
        ],
    })
    .to_string()
}

/// Applies `n`/`last` to `all`; returns the page and the `Link` header, if any.
fn paginate(path: &str, all: &[String], query: &HashMap<String, String>) -> (Vec<String>, Option<String>) {
    let Some(n) = query.get("n").and_then(|n| n.parse::<usize>().ok()) else {
        return (all.to_vec(), None);
    };
    let start = query
        .get("last")
        .and_then(|last| all.iter().position(|x| x == last))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = (start + n).min(all.len());
    let page = all[start..end].to_vec();
    let link = match page.last() {
        Some(last) if end < all.len() => Some(format!(
            "Link: <{path}?last={last}&n={n}>; rel=\"next\""
        )),
        _ => None,
    };
    (page, link)
}

fn json_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("\"{i}\"")).collect();
    format!("[{}]", quoted.join(","))
}
