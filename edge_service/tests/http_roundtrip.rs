use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use edge_service::serve_listener;
use mcrisk::prelude::*;
use serde_json::{json, Value};

fn start_server(config: EngineConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let engine = Arc::new(MonteCarloEngine::new(config).unwrap());
    thread::spawn(move || serve_listener(listener, engine));
    addr
}

fn send(addr: SocketAddr, raw: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(raw.as_bytes()).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_default();
    (status, body)
}

fn post(addr: SocketAddr, body: &Value) -> (u16, Value) {
    let body = body.to_string();
    let raw = format!(
        "POST /api/simulate HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let (status, body) = send(addr, &raw);
    (status, serde_json::from_str(&body).unwrap())
}

#[test]
fn test_simulate_over_http() {
    let addr = start_server(EngineConfig::new().with_seed(42));
    let request = json!({"prc_actual": 100.0, "volat": 0.2, "num_dias": 30, "num_sims": 500});

    let (status, first) = post(addr, &request);
    assert_eq!(status, 200);
    assert_eq!(first["ruta_prom"].as_array().unwrap().len(), 31);
    assert_eq!(first["simulaciones"].as_array().unwrap().len(), 100);

    // fixed seed: repeated requests are identical
    let (_, second) = post(addr, &request);
    assert_eq!(first, second);
}

#[test]
fn test_errors_over_http() {
    let addr = start_server(EngineConfig::new());

    let (status, body) = post(
        addr,
        &json!({"prc_actual": 0.0, "volat": 0.2, "num_dias": 30, "num_sims": 500}),
    );
    assert_eq!(status, 422);
    assert_eq!(body["field"], json!("prc_actual"));
    assert!(body["detail"].is_string());

    let (status, body) = post(
        addr,
        &json!({"prc_actual": 100.0, "volat": 0.2, "num_dias": 30, "num_sims": 1_000_000}),
    );
    assert_eq!(status, 413);
    assert_eq!(body["kind"], json!("resource_limit_exceeded"));

    let (status, body) = send(addr, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(status, 200);
    assert!(body.contains("msg"));
}
