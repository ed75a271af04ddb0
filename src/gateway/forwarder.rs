//! Usage: Forward one logical call to the SIGO backend and normalize what comes back.
//!
//! Each call is at-most-once: no retries, no gateway-level timeout. Upstream replies
//! (JSON or not) keep the backend status; anything that prevents a reply becomes a 500.

use super::backend_url::{build_backend_url, BackendBase};
use super::errors::{ForwardError, GatewayReply};
use super::normalize::normalize_keys;
use super::tls_policy::{build_relaxed_client, should_relax_tls};
use super::util::{headers_for_log, is_json_content_type, strip_hop_headers};
use crate::settings::{DeploymentMode, Settings};
use crate::shared::text::preview;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use serde_json::Value;
use std::time::Instant;
use tokio::sync::OnceCell;

const BODY_PREVIEW_CHARS: usize = 400;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend: BackendBase,
    pub mode: DeploymentMode,
}

impl GatewayConfig {
    pub fn new(backend_url: &str, mode: DeploymentMode) -> Self {
        Self {
            backend: BackendBase::new(backend_url),
            mode,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.backend_url, settings.mode)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForwardOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ForwardOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_body(method: Method, body: Value) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }
}

pub struct Gateway {
    config: GatewayConfig,
    relax_tls: bool,
    user_agent: String,
    client: reqwest::Client,
    relaxed_client: OnceCell<reqwest::Client>,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ForwardError> {
        let user_agent = format!("sigo-gateway/{}", env!("CARGO_PKG_VERSION"));
        let client = reqwest::Client::builder()
            .user_agent(user_agent.as_str())
            .build()
            .map_err(ForwardError::ClientInit)?;

        let relax_tls = should_relax_tls(&config.backend, config.mode);
        if !config.backend.is_well_formed() {
            tracing::warn!(
                backend_url = config.backend.as_str(),
                "backend URL is not an absolute URL; falling back to string handling"
            );
        }
        tracing::info!(
            backend_url = config.backend.as_str(),
            mode = config.mode.as_str(),
            relax_tls,
            "gateway configured"
        );

        Ok(Self {
            config,
            relax_tls,
            user_agent,
            client,
            relaxed_client: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn relaxes_tls(&self) -> bool {
        self.relax_tls
    }

    pub fn backend_url(&self, path: &str) -> String {
        build_backend_url(&self.config.backend, path)
    }

    pub async fn forward(&self, path: &str, options: ForwardOptions) -> GatewayReply {
        let url = self.backend_url(path);
        match self.try_forward(&url, options).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(
                    path,
                    url = %url,
                    error_code = err.code(),
                    error = %err,
                    "failed to contact backend"
                );
                GatewayReply::transport_failure(&err)
            }
        }
    }

    /// Like [`Gateway::forward`], with the backend path derived from the body.
    pub async fn forward_with_body<F>(
        &self,
        body: Value,
        path_builder: F,
        options: ForwardOptions,
    ) -> GatewayReply
    where
        F: FnOnce(&Value) -> String,
    {
        let path = path_builder(&body);
        let options = ForwardOptions {
            body: Some(body),
            ..options
        };
        self.forward(&path, options).await
    }

    async fn client_for_call(&self) -> Result<&reqwest::Client, ForwardError> {
        if !self.relax_tls {
            return Ok(&self.client);
        }
        self.relaxed_client
            .get_or_try_init(|| async {
                build_relaxed_client(&self.user_agent).map_err(ForwardError::ClientInit)
            })
            .await
    }

    async fn try_forward(
        &self,
        url: &str,
        options: ForwardOptions,
    ) -> Result<GatewayReply, ForwardError> {
        let ForwardOptions {
            method,
            headers,
            body,
        } = options;

        let headers = build_request_headers(headers, body.is_some());
        let body = body
            .map(|value| serde_json::to_vec(&value))
            .transpose()
            .map_err(ForwardError::Encode)?;

        let client = self.client_for_call().await?;
        let mut request = client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(ForwardError::Transport)?;
        let status = response.status();

        if !is_json_content_type(response.headers()) {
            let response_headers = headers_for_log(response.headers());
            let text = response.text().await.map_err(ForwardError::ReadBody)?;
            tracing::error!(
                url,
                status = status.as_u16(),
                headers = ?response_headers,
                preview = preview(&text, BODY_PREVIEW_CHARS),
                "backend returned non-JSON response"
            );
            return Ok(GatewayReply::upstream_non_json(status, text));
        }

        let bytes = response.bytes().await.map_err(ForwardError::ReadBody)?;
        let data: Value = serde_json::from_slice(&bytes).map_err(ForwardError::InvalidJson)?;

        tracing::debug!(
            method = %method,
            url,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "backend call completed"
        );

        Ok(GatewayReply::json(status, normalize_keys(data)))
    }
}

fn build_request_headers(mut headers: HeaderMap, has_body: bool) -> HeaderMap {
    strip_hop_headers(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("identity"),
    );
    if has_body && !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }
    headers
}
