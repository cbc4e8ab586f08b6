use crate::server::api::{self, SimulateError};
use crate::server::ServerState;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

pub fn route_request(state: &ServerState, method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload(state) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/units") => match api::units_payload(state) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/simulate") => {
            simulate_response(api::simulate_payload(state, body), "application/json")
        }
        ("POST", "/api/simulate/csv") => {
            simulate_response(api::simulate_csv_payload(state, body), "text/csv; charset=utf-8")
        }
        ("POST", "/api/sweep") => simulate_response(api::sweep_payload(state, body), "application/json"),
        ("POST", "/api/tech") => match api::tech_payload(body) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(400, "Bad Request", &format!("Invalid request body: {err}")),
        },
        _ => error_response(404, "Not Found", &format!("no route for {method} {path}")),
    }
}

fn simulate_response(
    outcome: Result<String, SimulateError>,
    content_type: &'static str,
) -> HttpResponse {
    match outcome {
        Ok(body) => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type,
            body,
        },
        Err(SimulateError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        Err(SimulateError::Validation(msg)) => error_response(400, "Bad Request", &msg),
        Err(SimulateError::Internal(msg)) => error_response(500, "Internal Server Error", &msg),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
