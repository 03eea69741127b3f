//! Minimal HTTP/1.1 registry for integration tests.
//!
//! Serves fixed responses by request path and records every request's path
//! and `Authorization` header. Paths with no route get 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug)]
struct Route {
    status: u16,
    body: Vec<u8>,
    /// Answer this many requests with 503 before serving the route.
    fail_first: AtomicUsize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Default)]
pub struct RegistryServerBuilder {
    routes: HashMap<String, Route>,
}

impl RegistryServerBuilder {
    /// Publish `name` with one tarball per `(version, tarball URL)`.
    pub fn package(self, name: &str, versions: &[(&str, &str)]) -> Self {
        let versions: serde_json::Map<String, serde_json::Value> = versions
            .iter()
            .map(|(version, tarball)| {
                (
                    version.to_string(),
                    serde_json::json!({
                        "name": name,
                        "version": version,
                        "dist": { "tarball": tarball }
                    }),
                )
            })
            .collect();
        let doc = serde_json::json!({ "name": name, "versions": versions });
        let path = format!("/{}", name.replace('/', "%2f"));
        self.route(&path, 200, doc.to_string().into_bytes())
    }

    pub fn file(self, path: &str, body: &[u8]) -> Self {
        self.route(path, 200, body.to_vec())
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        self.route(path, status, Vec::new())
    }

    /// The next `n` requests for `path` get 503.
    pub fn flaky(mut self, path: &str, n: usize) -> Self {
        if let Some(route) = self.routes.get_mut(path) {
            route.fail_first = AtomicUsize::new(n);
        }
        self
    }

    fn route(mut self, path: &str, status: u16, body: Vec<u8>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body,
                fail_first: AtomicUsize::new(0),
            },
        );
        self
    }

    /// Starts the server on a background thread. It runs until the process exits.
    pub fn start(self) -> RegistryServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        let requests: Arc<Mutex<Vec<Request>>> = Arc::default();
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });
        RegistryServer {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
        }
    }
}

pub struct RegistryServer {
    /// e.g. "http://127.0.0.1:12345" (no trailing slash).
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl RegistryServer {
    pub fn builder() -> RegistryServerBuilder {
        RegistryServerBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, log: &Mutex<Vec<Request>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let req = parse_request(request);
    log.lock().unwrap().push(req.clone());

    let (status, body): (u16, &[u8]) = match routes.get(&req.path) {
        Some(route) => {
            let flaky = route
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if flaky {
                (503, &b""[..])
            } else {
                (route.status, route.body.as_slice())
            }
        }
        None => (404, &b"not found"[..]),
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn parse_request(request: &str) -> Request {
    let mut lines = request.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    let mut authorization = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }
    Request {
        path,
        authorization,
    }
}
