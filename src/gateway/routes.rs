use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{get, MethodRouter},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use super::errors::GatewayReply;
use super::forwarder::ForwardOptions;
use super::manager::GatewayAppState;
use super::resources::{Lookup, Resource, RESOURCES};
use super::util::now_unix_seconds;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app: &'static str,
    version: &'static str,
    ts: u64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "sigo-gateway",
        version: env!("CARGO_PKG_VERSION"),
        ts: now_unix_seconds(),
    })
}

async fn root() -> &'static str {
    "SIGO gateway is running"
}

async fn forward_without_body(state: &GatewayAppState, method: Method, path: &str) -> GatewayReply {
    state
        .gateway
        .forward(path, ForwardOptions::method(method))
        .await
}

async fn forward_json_body(
    state: &GatewayAppState,
    method: Method,
    path: &str,
    body: &Bytes,
) -> GatewayReply {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(path, error = %err, "rejected request body that is not JSON");
            return GatewayReply::message(
                StatusCode::BAD_REQUEST,
                format!("invalid JSON request body: {err}"),
            );
        }
    };
    state
        .gateway
        .forward(path, ForwardOptions::with_body(method, value))
        .await
}

fn collection_routes(resource: &'static Resource) -> MethodRouter<GatewayAppState> {
    get(move |State(state): State<GatewayAppState>| async move {
        forward_without_body(&state, Method::GET, resource.list).await
    })
    .post(
        move |State(state): State<GatewayAppState>, body: Bytes| async move {
            forward_json_body(&state, Method::POST, resource.create, &body).await
        },
    )
}

/// Backend path for a decoded path parameter. Values that would leave their own
/// segment (separators, query, fragment, dot segments) are refused with a 400.
fn param_path(value: &str, build: impl FnOnce(&str) -> String) -> Result<String, GatewayReply> {
    let leaves_segment = value.contains(['/', '\\', '?', '#']) || matches!(value, "." | "..");
    if value.is_empty() || leaves_segment {
        tracing::warn!(value, "rejected path parameter");
        return Err(GatewayReply::message(
            StatusCode::BAD_REQUEST,
            format!("invalid path parameter: {value:?}"),
        ));
    }
    Ok(build(value))
}

fn item_routes(resource: &'static Resource) -> MethodRouter<GatewayAppState> {
    let mut routes = MethodRouter::new();

    if let Some(action) = resource.get {
        routes = routes.get(
            move |State(state): State<GatewayAppState>, Path(id): Path<String>| async move {
                match param_path(&id, |id| action.path(id)) {
                    Ok(path) => forward_without_body(&state, Method::GET, &path).await,
                    Err(reply) => reply,
                }
            },
        );
    }
    if let Some(action) = resource.update {
        routes = routes.put(
            move |State(state): State<GatewayAppState>, Path(id): Path<String>, body: Bytes| async move {
                match param_path(&id, |id| action.path(id)) {
                    Ok(path) => forward_json_body(&state, Method::PUT, &path, &body).await,
                    Err(reply) => reply,
                }
            },
        );
    }
    if let Some(action) = resource.delete {
        routes = routes.delete(
            move |State(state): State<GatewayAppState>, Path(id): Path<String>| async move {
                match param_path(&id, |id| action.path(id)) {
                    Ok(path) => forward_without_body(&state, Method::DELETE, &path).await,
                    Err(reply) => reply,
                }
            },
        );
    }

    routes
}

fn lookup_routes(lookup: &'static Lookup) -> MethodRouter<GatewayAppState> {
    get(
        move |State(state): State<GatewayAppState>, Path(value): Path<String>| async move {
            match param_path(&value, |value| lookup.path(value)) {
                Ok(path) => forward_without_body(&state, Method::GET, &path).await,
                Err(reply) => reply,
            }
        },
    )
}

fn resource_router(resource: &'static Resource) -> Router<GatewayAppState> {
    let mut router = Router::new().route(&resource.collection_route(), collection_routes(resource));
    if let Some(item_route) = resource.item_route() {
        router = router.route(&item_route, item_routes(resource));
    }
    for lookup in resource.lookups {
        router = router.route(&resource.lookup_route(lookup), lookup_routes(lookup));
    }
    router
}

pub(super) fn build_router(state: GatewayAppState) -> Router {
    let api = RESOURCES
        .iter()
        .fold(Router::new(), |router, resource| router.merge(resource_router(resource)));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}
