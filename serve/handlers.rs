use std::io::{Cursor, Read};

use serde::Deserialize;
use tiny_http::{Request, Response};

use digit_nn::{Network, NetworkError};

use crate::routes::{error_response, json_response};

/// Body of `POST /guess`.
#[derive(Deserialize)]
struct GuessRequest {
    input: Vec<f64>,
}

/// Runs one drawing through the network. Wrong input length is 422, an
/// unreadable body 400.
pub fn handle_guess(request: &mut Request, network: &Network) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return error_response(400, &format!("could not read body: {e}"));
    }

    let parsed: GuessRequest = match serde_json::from_str(&body) {
        Ok(p) => p,
        Err(e) => return error_response(400, &format!("invalid JSON: {e}")),
    };

    match network.guess(&parsed.input) {
        Ok(guess) => match serde_json::to_string(&guess) {
            Ok(json) => json_response(200, json),
            Err(e) => error_response(500, &e.to_string()),
        },
        Err(e @ NetworkError::DimensionMismatch { .. }) => error_response(422, &e.to_string()),
        Err(e) => error_response(500, &e.to_string()),
    }
}

pub fn handle_topology(network: &Network) -> Response<Cursor<Vec<u8>>> {
    match serde_json::to_string(network.topology()) {
        Ok(json) => json_response(200, json),
        Err(e) => error_response(500, &e.to_string()),
    }
}
