use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use digit_nn::Network;

use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &[u8], value: &[u8]) -> Vec<Header> {
    Header::from_bytes(name, value).map(|h| vec![h]).unwrap_or_default()
}

pub fn json_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header(b"Content-Type", b"application/json"),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn text_response(status: u16, body: &str) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.as_bytes().to_vec();
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        header(b"Content-Type", b"text/plain; charset=utf-8"),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    json_response(status, serde_json::json!({ "error": message }).to_string())
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    text_response(404, "404 Not Found")
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

pub fn dispatch(mut request: Request, network: &Network) {
    let method = request.method().clone();
    let url = request.url().to_owned();
    let path = url.split('?').next().unwrap_or("").to_owned();
    debug!(%method, %path, "request");

    let response = match (method, path.as_str()) {
        (Method::Post, "/guess")    => handlers::handle_guess(&mut request, network),
        (Method::Get,  "/topology") => handlers::handle_topology(network),
        (Method::Get,  "/health")   => text_response(200, "ok"),
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        warn!(error = %e, "failed to send response");
    }
}
