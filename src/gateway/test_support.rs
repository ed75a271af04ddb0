//! Usage: In-process stand-in for the SIGO backend, bound to an ephemeral loopback port.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) accept: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) cache_control: Option<String>,
    pub(crate) body: Option<Value>,
}

pub(crate) type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

pub(crate) async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Backend that records every call and answers with a camelCase echo of it.
pub(crate) async fn spawn_echo_backend() -> (SocketAddr, CallLog) {
    let calls: CallLog = Arc::default();
    let calls_for_handler = calls.clone();
    let router = Router::new().fallback(move |req: Request<Body>| {
        let calls = calls_for_handler.clone();
        async move { echo(req, calls).await }
    });
    (spawn_server(router).await, calls)
}

async fn echo(req: Request<Body>, calls: CallLog) -> Response {
    let (parts, body) = req.into_parts();
    let header_str = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&bytes).ok()
    };

    let call = RecordedCall {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        accept: header_str(header::ACCEPT),
        content_type: header_str(header::CONTENT_TYPE),
        cache_control: header_str(header::CACHE_CONTROL),
        body: body.clone(),
    };
    calls.lock().unwrap().push(call.clone());

    Json(json!({
        "code": 200,
        "message": null,
        "data": {
            "method": call.method,
            "path": call.path,
            "body": body,
        }
    }))
    .into_response()
}

pub(crate) async fn spawn_static_backend(
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> SocketAddr {
    let router = Router::new().fallback(move || async move {
        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    });
    spawn_server(router).await
}

/// A loopback address nothing listens on.
pub(crate) fn closed_port_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    addr
}
