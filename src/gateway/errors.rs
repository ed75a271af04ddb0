//! Usage: Forwarding error classification + JSON reply envelopes.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const UNKNOWN_TRANSPORT_MESSAGE: &str = "unknown error contacting backend";

/// Everything that prevents a call from yielding an upstream reply. Always surfaced
/// to callers as a 500 with `{ message }`.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to read backend response: {0}")]
    ReadBody(#[source] reqwest::Error),
    #[error("backend returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

impl ForwardError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ClientInit(_) => "GW_HTTP_CLIENT_INIT",
            Self::Encode(_) => "GW_REQUEST_ENCODE",
            Self::Transport(err) => classify_reqwest_error(err),
            Self::ReadBody(_) | Self::InvalidJson(_) => "GW_UPSTREAM_BODY_INVALID",
        }
    }
}

pub(super) fn classify_reqwest_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        return "GW_UPSTREAM_TIMEOUT";
    }
    if err.is_connect() {
        return "GW_UPSTREAM_CONNECT_FAILED";
    }
    "GW_INTERNAL_ERROR"
}

#[derive(Debug, Serialize)]
struct UpstreamErrorEnvelope {
    message: String,
    #[serde(rename = "backendStatus")]
    backend_status: u16,
}

#[derive(Debug, Serialize)]
struct MessageEnvelope {
    message: String,
}

/// Result of one forwarded call: status to answer with and the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayReply {
    pub status: StatusCode,
    pub body: Value,
}

impl GatewayReply {
    pub(super) fn json(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Backend answered with something other than JSON; keep its status.
    pub(super) fn upstream_non_json(status: StatusCode, text: String) -> Self {
        let message = if text.is_empty() {
            format!("unexpected backend response (status {})", status.as_u16())
        } else {
            text
        };
        Self {
            status,
            body: to_value(UpstreamErrorEnvelope {
                message,
                backend_status: status.as_u16(),
            }),
        }
    }

    pub(super) fn transport_failure(err: &ForwardError) -> Self {
        let message = err.to_string();
        let message = if message.trim().is_empty() {
            UNKNOWN_TRANSPORT_MESSAGE.to_string()
        } else {
            message
        };
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub(crate) fn message(status: StatusCode, message: String) -> Self {
        Self {
            status,
            body: to_value(MessageEnvelope { message }),
        }
    }
}

fn to_value<T: Serialize>(envelope: T) -> Value {
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}

impl IntoResponse for GatewayReply {
    fn into_response(self) -> Response {
        let mut resp = (self.status, Json(self.body)).into_response();
        resp.headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_json_reply_keeps_backend_status_and_text() {
        let reply = GatewayReply::upstream_non_json(StatusCode::BAD_GATEWAY, "proxy down".into());
        assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            reply.body,
            json!({ "message": "proxy down", "backendStatus": 502 })
        );
    }

    #[test]
    fn empty_non_json_body_gets_fallback_message() {
        let reply = GatewayReply::upstream_non_json(StatusCode::BAD_GATEWAY, String::new());
        let message = reply.body["message"].as_str().unwrap();
        assert!(message.contains("502"));
        assert_eq!(reply.body["backendStatus"], 502);
    }

    #[test]
    fn invalid_backend_json_maps_to_500_message_envelope() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        let err = ForwardError::InvalidJson(err);
        assert_eq!(err.code(), "GW_UPSTREAM_BODY_INVALID");

        let reply = GatewayReply::transport_failure(&err);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = reply.body.as_object().unwrap();
        assert_eq!(body.len(), 1);
        assert!(body["message"].as_str().unwrap().starts_with("backend returned invalid JSON"));
    }

    #[test]
    fn reply_disables_caching() {
        let resp = GatewayReply::json(StatusCode::OK, json!({})).into_response();
        assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    }
}
