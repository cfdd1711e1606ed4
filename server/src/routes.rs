//! HTTP route handlers and router configuration

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::extract::{DefaultBodyLimit, FromRequest, Query, Request, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use yarrrml::base::{derive_base, sniff_base};
use yarrrml::serializer::{serialize, Format};
use yarrrml::{Converter, Logger};

/// Build the main application router
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.body_limit;
    Router::new()
        .route("/", get(convert_get).post(convert_post))
        .route("/api/yarrrmltorml", post(convert_post))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Parameters of a conversion request.
///
/// They can be passed in the query string, or in a form or JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    /// The YARRRML document
    pub yarrrml: Option<String>,
    /// Where to fetch the YARRRML document, when `yarrrml` is not given
    pub url: Option<String>,
    /// Base IRI of the generated rules
    pub base: Option<String>,
    /// Output format (`ntriples`, `nquads`, `turtle`...)
    pub format: Option<String>,
}

impl ConvertParams {
    /// Fill the parameters missing in `self` with those of `other`.
    fn or(self, other: ConvertParams) -> Self {
        ConvertParams {
            yarrrml: self.yarrrml.or(other.yarrrml),
            url: self.url.or(other.url),
            base: self.base.or(other.base),
            format: self.format.or(other.format),
        }
    }
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    log::debug!("health check requested");
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /?yarrrml=...`
pub async fn convert_get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ConvertParams>,
) -> Result<Response> {
    convert(state, params, headers).await
}

/// `POST /`, with a form, JSON or raw YARRRML body.
///
/// `url`, `base` and `format` can also be passed in the query string.
pub async fn convert_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConvertParams>,
    request: Request,
) -> Result<Response> {
    let headers = request.headers().clone();
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let body = if content_type.starts_with("application/x-www-form-urlencoded") {
        Form::<ConvertParams>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::Rejection(e.status(), e.body_text()))?
            .0
    } else if content_type.starts_with("application/json") {
        Json::<ConvertParams>::from_request(request, &state)
            .await
            .map_err(|e| ServerError::Rejection(e.status(), e.body_text()))?
            .0
    } else {
        let text = String::from_request(request, &state)
            .await
            .map_err(|e| ServerError::Rejection(e.status(), e.body_text()))?;
        ConvertParams {
            yarrrml: Some(text),
            ..Default::default()
        }
    };
    convert(state, body.or(query), headers).await
}

async fn convert(
    state: Arc<AppState>,
    params: ConvertParams,
    headers: HeaderMap,
) -> Result<Response> {
    let non_blank = |txt: &String| !txt.trim().is_empty();
    let yarrrml = match (params.yarrrml.filter(non_blank), params.url.filter(non_blank)) {
        (Some(yarrrml), _) => yarrrml,
        (None, Some(url)) => fetch(&state, url.trim()).await?,
        (None, None) => return Err(ServerError::MissingYarrrml),
    };
    if yarrrml.trim().is_empty() {
        return Err(ServerError::MissingYarrrml);
    }
    let format = match params.format.as_deref().filter(|f| !f.is_empty()) {
        Some(name) => name.parse::<Format>()?,
        None => headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .and_then(Format::from_accept)
            .unwrap_or_default(),
    };
    let base = params.base;
    tokio::task::spawn_blocking(move || rules(&state, &yarrrml, base.as_deref(), format))
        .await
        .map_err(|e| ServerError::Internal(format!("conversion task failed: {e}")))?
}

/// Convert `yarrrml` and serialize the result.
fn rules(
    state: &AppState,
    yarrrml: &str,
    base: Option<&str>,
    format: Format,
) -> Result<Response> {
    let mut base_log = Logger::new();
    let base = derive_base(
        base,
        sniff_base(yarrrml).as_deref(),
        &state.default_base,
        &mut base_log,
    );
    let mut converter = Converter::with_base(&base)?;
    let quads = converter.convert(yarrrml);
    if converter.logger().has_errors() {
        let mut entries = base_log.get_all().to_vec();
        entries.extend_from_slice(converter.logger().get_all());
        return Err(ServerError::Conversion(entries));
    }

    let body = serialize(&quads, format, converter.prefixes())?;
    log::info!(
        "converted {} bytes of YARRRML into {} quads ({format}, base <{base}>)",
        yarrrml.len(),
        quads.len()
    );
    Ok(([(CONTENT_TYPE, format.media_type())], body).into_response())
}

/// Fetch a YARRRML document over http(s).
async fn fetch(state: &AppState, url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| ServerError::Fetch(format!("invalid URL <{url}>: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ServerError::Fetch(format!(
            "unsupported URL scheme '{}', expected http or https",
            parsed.scheme()
        )));
    }
    let too_large = || {
        ServerError::Rejection(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("document at <{url}> exceeds {} bytes", state.config.body_limit),
        )
    };
    let response = state
        .client
        .get(parsed)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ServerError::Fetch(format!("<{url}>: {e}")))?;
    if response
        .content_length()
        .is_some_and(|len| len > state.config.body_limit as u64)
    {
        return Err(too_large());
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ServerError::Fetch(format!("<{url}>: {e}")))?;
    if bytes.len() > state.config.body_limit {
        return Err(too_large());
    }
    log::info!("fetched {} bytes from <{url}>", bytes.len());
    String::from_utf8(bytes.to_vec())
        .map_err(|_| ServerError::Fetch(format!("<{url}> is not UTF-8 text")))
}
