//! In-process HTTP server standing in for the metadata and logging APIs.
//!
//! Compiled for unit tests and, behind the `test-util` feature, for the
//! integration tests.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::Arc,
    thread,
    time::Duration,
};

use parking_lot::Mutex;

#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Route = (String, u16, String);

/// Serves fixed responses by path; unknown paths get `404`.
pub struct MetadataServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MetadataServer {
    pub fn spawn(routes: Vec<(&str, u16, &str)>) -> Self {
        let routes: Vec<Route> = routes
            .into_iter()
            .map(|(p, s, b)| (p.to_string(), s, b.to_string()))
            .collect();
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let request = read_request(&mut stream);
                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| *path == request.path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, String::new()));
                seen.lock().push(request);
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    reason(status),
                    body.len()
                );
            }
        });
        Self { addr, requests }
    }

    /// A server answering the four lookups a GCE host performs.
    pub fn gce(project: &str, name: &str, id: &str, zone: &str) -> Self {
        Self::spawn(vec![
            ("/project/project-id", 200, project),
            ("/instance/name", 200, name),
            ("/instance/id", 200, id),
            ("/instance/zone", 200, zone),
            (
                "/instance/service-accounts/default/token",
                200,
                r#"{"access_token":"meta-token","expires_in":3599,"token_type":"Bearer"}"#,
            ),
            ("/v2/entries:write", 200, "{}"),
        ])
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }

    /// Wait until a request for `path` arrives.
    pub fn wait_for(&self, path: &str) -> Option<CapturedRequest> {
        for _ in 0..100 {
            if let Some(found) = self.requests().into_iter().find(|r| r.path == path) {
                return Some(found);
            }
            thread::sleep(Duration::from_millis(50));
        }
        None
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    let _ = reader.read_line(&mut request_line);
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim().to_string();
            if key == "content-length" {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((key, value));
        }
    }
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        let _ = reader.read_exact(&mut body);
    }
    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}
