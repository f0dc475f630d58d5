use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mcrisk::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Longest request line or header line accepted, in bytes.
pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// Connections served at once; further clients get a 503.
pub const MAX_CONNECTIONS: usize = 64;

const MAX_HEADER_LINES: usize = 100;

const READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed HTTP request: {0}")]
    MalformedHttp(String),
    #[error("Request body of {0} bytes is too large")]
    BodyTooLarge(usize),
    #[error("Engine error: {0}")]
    Engine(#[from] SimulationError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EdgeError>;

#[derive(Serialize)]
struct StatusBody {
    msg: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> HttpResponse {
        match serde_json::to_string(value) {
            Ok(body) => HttpResponse { status, body },
            Err(e) => {
                error!("failed to serialize response: {}", e);
                HttpResponse {
                    status: 500,
                    body: r#"{"detail":"failed to serialize response","kind":"internal"}"#
                        .to_string(),
                }
            }
        }
    }

    fn error(status: u16, body: ErrorBody) -> HttpResponse {
        Self::json(status, &body)
    }

    fn empty(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: String::new(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            422 => "Unprocessable Entity",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
             Access-Control-Allow-Headers: *\r\n\
             Connection: close\r\n\
             Content-Length: {}\r\n",
            self.status,
            self.reason(),
            self.body.len()
        );
        if !self.body.is_empty() {
            head.push_str("Content-Type: application/json\r\n");
        }
        head.push_str("\r\n");
        head + &self.body
    }
}

/// HTTP status for an engine failure.
pub fn status_for(err: &SimulationError) -> u16 {
    match err {
        SimulationError::InvalidParameter { .. } => 422,
        SimulationError::ResourceLimitExceeded { .. } => 413,
        SimulationError::Cancelled | SimulationError::WorkerPool(_) => 500,
    }
}

fn simulate(engine: &MonteCarloEngine, body: &[u8]) -> HttpResponse {
    let body: SimulateRequestBody = match serde_json::from_slice(body) {
        Ok(b) => b,
        Err(e) => {
            warn!("rejected malformed body: {}", e);
            return HttpResponse::error(400, ErrorBody::malformed(format!("Invalid JSON body: {}", e)));
        }
    };
    let result = SimulationRequest::try_from(body).and_then(|request| engine.run(&request));
    match result {
        Ok(result) => HttpResponse::json(200, &SimulateResponseBody::from(result)),
        Err(e) => {
            warn!(kind = e.kind(), "rejected simulation: {}", e);
            HttpResponse::error(status_for(&e), ErrorBody::from(&e))
        }
    }
}

/// Dispatches one parsed request. Socket-free, so every route is testable
/// directly.
pub fn route(engine: &MonteCarloEngine, request: &HttpRequest) -> HttpResponse {
    let path = request.path.split('?').next().unwrap_or("");
    match (request.method.as_str(), path) {
        ("OPTIONS", _) => HttpResponse::empty(204),
        ("GET", "/") => HttpResponse::json(
            200,
            &StatusBody {
                msg: "Monte Carlo risk simulation API is up",
            },
        ),
        ("POST", "/api/simulate") => simulate(engine, &request.body),
        (_, "/") | (_, "/api/simulate") => HttpResponse::error(
            405,
            ErrorBody::malformed(format!("Method {} not allowed on {}", request.method, path)),
        ),
        _ => HttpResponse::error(404, ErrorBody::malformed(format!("No route for {}", path))),
    }
}

/// Reads one line into `line`, refusing lines longer than `MAX_LINE_BYTES`.
fn read_line_bounded<R: BufRead>(reader: &mut R, line: &mut String) -> Result<usize> {
    let limit = MAX_LINE_BYTES as u64 + 1;
    let n = match reader.by_ref().take(limit).read_line(line) {
        Ok(n) => n,
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(EdgeError::MalformedHttp("request head is not UTF-8".to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    if n > MAX_LINE_BYTES {
        return Err(EdgeError::MalformedHttp(format!(
            "header line longer than {} bytes",
            MAX_LINE_BYTES
        )));
    }
    Ok(n)
}

/// Reads the request line, headers and a `Content-Length` body.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<HttpRequest> {
    let mut line = String::new();
    read_line_bounded(reader, &mut line)?;
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| EdgeError::MalformedHttp("empty request line".to_string()))?
        .to_string();
    let path = parts
        .next()
        .ok_or_else(|| EdgeError::MalformedHttp("missing request target".to_string()))?
        .to_string();

    let mut content_length = 0usize;
    for _ in 0..MAX_HEADER_LINES {
        line.clear();
        if read_line_bounded(reader, &mut line)? == 0 {
            break;
        }
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().map_err(|_| {
                    EdgeError::MalformedHttp(format!("bad Content-Length `{}`", value.trim()))
                })?;
            }
        }
    }
    if content_length > MAX_BODY_BYTES {
        return Err(EdgeError::BodyTooLarge(content_length));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => EdgeError::MalformedHttp(format!(
            "body shorter than Content-Length {}",
            content_length
        )),
        _ => EdgeError::Io(e),
    })?;
    Ok(HttpRequest { method, path, body })
}

fn handle_connection(mut stream: TcpStream, engine: &MonteCarloEngine) -> Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let response = match read_request(&mut reader) {
        Ok(request) => {
            info!(method = %request.method, path = %request.path, "request");
            route(engine, &request)
        }
        Err(EdgeError::BodyTooLarge(n)) => {
            warn!("rejected body of {} bytes", n);
            HttpResponse::error(
                413,
                ErrorBody::malformed(format!("Request body of {} bytes is too large", n)),
            )
        }
        Err(EdgeError::Io(e)) => return Err(EdgeError::Io(e)),
        Err(e) => HttpResponse::error(400, ErrorBody::malformed(e.to_string())),
    };
    reply(&mut stream, &response)
}

fn reply(stream: &mut TcpStream, response: &HttpResponse) -> Result<()> {
    stream.write_all(response.to_http().as_bytes())?;
    stream.flush()?;
    Ok(())
}

/// Holds one slot of the connection budget until dropped.
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<ConnectionSlot> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| ConnectionSlot(Arc::clone(active)))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Accepts connections forever, one thread per connection, at most
/// `MAX_CONNECTIONS` at a time.
pub fn serve_listener(listener: TcpListener, engine: Arc<MonteCarloEngine>) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    let active = Arc::new(AtomicUsize::new(0));
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let Some(slot) = ConnectionSlot::acquire(&active, MAX_CONNECTIONS) else {
                    warn!("connection limit of {} reached", MAX_CONNECTIONS);
                    let busy = HttpResponse::error(
                        503,
                        ErrorBody::malformed("Too many concurrent connections"),
                    );
                    if let Err(e) = reply(&mut stream, &busy) {
                        error!("failed to refuse connection: {}", e);
                    }
                    continue;
                };
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let _slot = slot;
                    if let Err(e) = handle_connection(stream, &engine) {
                        error!("connection failed: {}", e);
                    }
                });
            }
            Err(e) => error!("accept failed: {}", e),
        }
    }
    Ok(())
}

pub fn serve(addr: &str, config: EngineConfig) -> Result<()> {
    let engine = Arc::new(MonteCarloEngine::new(config)?);
    let listener = TcpListener::bind(addr)?;
    serve_listener(listener, engine)
}
