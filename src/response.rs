//! # Response Formatting
//!
//! Gateway-style responses: a status code, permissive CORS headers and a
//! JSON-encoded body. Bodies take one of two shapes:
//! - `{"status": <reason phrase>, "result": <value>}`
//! - `{"message": <text>}` when a specific backend error code is available

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{format_error_chain, PartitionError, RETRY_MESSAGE};
use crate::identity::IdentityError;

/// HTTP statuses the partition layer answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok,
    Created,
    BadRequest,
    Unauthorized,
    InternalServerError,
    ServiceUnavailable,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::Created => 201,
            HttpStatus::BadRequest => 400,
            HttpStatus::Unauthorized => 401,
            HttpStatus::InternalServerError => 500,
            HttpStatus::ServiceUnavailable => 503,
        }
    }

    pub fn phrase(&self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::Created => "Created",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Unauthorized => "Unauthorized",
            HttpStatus::InternalServerError => "Internal Server Error",
            HttpStatus::ServiceUnavailable => "Service Unavailable",
        }
    }

    fn from_code(code: u16) -> Self {
        match code {
            200 => HttpStatus::Ok,
            201 => HttpStatus::Created,
            400 => HttpStatus::BadRequest,
            401 => HttpStatus::Unauthorized,
            503 => HttpStatus::ServiceUnavailable,
            _ => HttpStatus::InternalServerError,
        }
    }
}

/// CORS headers attached to every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsHeaders {
    #[serde(rename = "Access-Control-Allow-Origin")]
    pub allow_origin: String,
    #[serde(rename = "Access-Control-Allow-Headers")]
    pub allow_headers: String,
    #[serde(rename = "Access-Control-Allow-Credentials")]
    pub allow_credentials: bool,
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_headers: "Content-Type".to_string(),
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: CorsHeaders,
    /// JSON-encoded body
    pub body: String,
}

impl Response {
    fn create(body: Value, status: HttpStatus) -> Self {
        Self {
            status_code: status.code(),
            headers: CorsHeaders::default(),
            body: body.to_string(),
        }
    }

    pub fn success(result: Value, status: HttpStatus) -> Self {
        Self::create(json!({ "status": status.phrase(), "result": result }), status)
    }

    pub fn failure(result: Value, status: HttpStatus) -> Self {
        Self::create(json!({ "status": status.phrase(), "result": result }), status)
    }

    /// Failure whose body carries only `message`
    pub fn failure_message(message: &str, status: HttpStatus) -> Self {
        Self::create(json!({ "message": message }), status)
    }

    /// Translate a failure into the response the caller sees
    pub fn from_error(err: &PartitionError) -> Self {
        let status = HttpStatus::from_code(err.status_code());
        if let Some(code) = err.backend_code() {
            return Self::failure_message(code, status);
        }

        match err {
            PartitionError::InvalidApproach => {
                Self::failure(json!({ "invalid": "input for partition approach" }), status)
            }
            PartitionError::MissingObject => {
                Self::failure(json!({ "invalid": "object key" }), status)
            }
            PartitionError::MalformedBody(_) => {
                Self::failure(json!({ "invalid": "request body" }), status)
            }
            PartitionError::MissingFields(fields) => {
                Self::failure(json!({ "missing_fields": fields }), status)
            }
            PartitionError::Unavailable => Self::failure(json!(RETRY_MESSAGE), status),
            PartitionError::Identity(IdentityError::InvalidIdentifier(field)) => {
                Self::failure(json!({ "invalid": field }), status)
            }
            _ => Self::failure(json!(format_error_chain(err)), status),
        }
    }

    /// Decoded body
    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }

    /// `result` field of the body, if present
    pub fn result(&self) -> Option<Value> {
        self.body_json().get("result").cloned()
    }

    /// `message` field of the body, if present
    pub fn message(&self) -> Option<String> {
        self.body_json()
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
