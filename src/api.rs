//! HTTP API for the storefront widget
//!
//! Raw HTTP/1.1 request text in, raw response text out. The `server` binary
//! owns the sockets; everything here is plain request handling so it can be
//! exercised without a listener.

use crate::bike::BikeQuery;
use crate::catalog::StaticTable;
use crate::error::CompatError;
use crate::geometry::GeometrySource;
use crate::kits::KitName;
use crate::render::HtmlRenderer;
use crate::resolver::analyze;
use crate::verdict::{CompatibilityVerdict, VerdictSource, VerdictStatus};
use crate::widget::analyze_text;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const API_VERSION: &str = "1.0";
pub const DEFAULT_SUGGESTIONS: usize = 8;
pub const MAX_SUGGESTIONS: usize = 20;

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct ApiState {
    pub table: &'static StaticTable,
    pub source: Option<Arc<dyn GeometrySource>>,
}

impl ApiState {
    pub fn new(source: Option<Arc<dyn GeometrySource>>) -> Self {
        Self {
            table: StaticTable::reference(),
            source,
        }
    }

    fn source(&self) -> Option<&dyn GeometrySource> {
        self.source.as_deref()
    }
}

/// Wire shape of `/api/compat`.
#[derive(Debug, Serialize)]
pub struct CompatResponse {
    pub status: VerdictStatus,
    pub kits: Vec<KitName>,
    pub recommendation_ref: Option<String>,
    pub recommendation_url: Option<String>,
    pub notes: String,
    pub source: VerdictSource,
    pub timestamp: String,
    pub api_version: &'static str,
}

impl From<&CompatibilityVerdict> for CompatResponse {
    fn from(verdict: &CompatibilityVerdict) -> Self {
        Self {
            status: verdict.status(),
            kits: verdict.kits().to_vec(),
            recommendation_ref: verdict.recommendation_ref().map(str::to_string),
            recommendation_url: verdict.recommendation_url(),
            notes: verdict.note().to_string(),
            source: verdict.source(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            api_version: API_VERSION,
        }
    }
}

pub async fn handle_request(state: &ApiState, request: &str) -> String {
    let Some(request_line) = request.lines().next() else {
        return create_response(400, "Bad Request", "{}");
    };
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return create_response(400, "Bad Request", "{}");
    }

    let method = parts[0];
    let (path_str, params) = split_target(parts[1]);

    // Normalize path (remove trailing slash except for root)
    let mut normalized_path = path_str.trim_end_matches('/').to_string();
    if normalized_path.is_empty() {
        normalized_path = "/".to_string();
    }
    let path = normalized_path.as_str();

    debug!(method, path, "request");

    match (method, path) {
        ("OPTIONS", _) => create_response(204, "No Content", ""),
        ("GET", "/api/health") => health(state),
        ("GET", "/api/brands") => brands(state),
        ("GET", "/api/compat") => compat(state, &params).await,
        ("GET", "/api/suggest") => suggest(state, &params),
        ("GET", "/api/panel") => panel(state, &params).await,
        _ => json_response(
            404,
            "Not Found",
            &serde_json::json!({
                "error": "Not found",
                "message": "The requested endpoint does not exist"
            }),
        ),
    }
}

/// Split a request target into path and decoded query parameters.
fn split_target(target: &str) -> (String, HashMap<String, String>) {
    match reqwest::Url::parse(&format!("http://localhost{}", target)) {
        Ok(url) => (
            url.path().to_string(),
            url.query_pairs().into_owned().collect(),
        ),
        Err(_) => (target.to_string(), HashMap::new()),
    }
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(|v| v.trim()).unwrap_or_default()
}

fn health(state: &ApiState) -> String {
    json_response(
        200,
        "OK",
        &serde_json::json!({
            "status": "healthy",
            "version": API_VERSION,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "bikes_count": state.table.len(),
        }),
    )
}

fn brands(state: &ApiState) -> String {
    let brands = state.table.brands();
    json_response(
        200,
        "OK",
        &serde_json::json!({
            "count": brands.len(),
            "brands": brands,
        }),
    )
}

async fn compat(state: &ApiState, params: &HashMap<String, String>) -> String {
    let brand = param(params, "brand");
    let model = param(params, "model");
    if brand.is_empty() || model.is_empty() {
        return json_response(
            400,
            "Bad Request",
            &serde_json::json!({
                "error": "Missing required parameters",
                "message": "Both brand and model are required"
            }),
        );
    }

    let query = BikeQuery::new(brand, model);
    if let Err(e) = query.validate() {
        let message = match e {
            CompatError::Validation(message) => message,
            other => other.to_string(),
        };
        warn!(brand, model, %message, "rejected compatibility request");
        return json_response(
            400,
            "Bad Request",
            &serde_json::json!({ "error": "Validation error", "message": message }),
        );
    }

    let verdict = analyze(&query, state.source(), state.table).await;
    json_response(200, "OK", &CompatResponse::from(&verdict))
}

fn suggest(state: &ApiState, params: &HashMap<String, String>) -> String {
    let limit = param(params, "limit")
        .parse::<usize>()
        .unwrap_or(DEFAULT_SUGGESTIONS)
        .clamp(1, MAX_SUGGESTIONS);
    let suggestions = state.table.suggest(param(params, "q"), limit);
    json_response(
        200,
        "OK",
        &serde_json::json!({
            "count": suggestions.len(),
            "suggestions": suggestions,
        }),
    )
}

async fn panel(state: &ApiState, params: &HashMap<String, String>) -> String {
    let mut renderer = HtmlRenderer::new();
    // Blank input already rendered the validation panel.
    let _ = analyze_text(param(params, "q"), state.source(), state.table, &mut renderer).await;
    create_response_with_type(200, "OK", "text/html; charset=utf-8", renderer.html())
}

fn json_response<T: Serialize>(status: u16, status_text: &str, body: &T) -> String {
    match serde_json::to_string(body) {
        Ok(json) => create_response(status, status_text, &json),
        Err(e) => {
            warn!(error = %e, "failed to serialize response");
            create_response(
                500,
                "Internal Server Error",
                r#"{"error":"Internal server error","message":"An unexpected error occurred"}"#,
            )
        }
    }
}

pub fn create_response(status: u16, status_text: &str, body: &str) -> String {
    create_response_with_type(status, status_text, "application/json", body)
}

pub fn create_response_with_type(
    status: u16,
    status_text: &str,
    content_type: &str,
    body: &str,
) -> String {
    format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: GET, OPTIONS\r\n\
         Access-Control-Allow-Headers: Content-Type\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        status_text,
        content_type,
        body.len(),
        body
    )
}
