// 🌐 HTTP API
// axum routes over SwiftService, mounted under /{API_VERSION}

use crate::config::normalize_api_version;
use crate::db::SqliteStore;
use crate::error::{ErrorKind, ServiceError};
use crate::service::SwiftService;
use crate::validators::Record;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SwiftService<SqliteStore>>,
    /// Expose internal error messages
    pub debug: bool,
}

impl AppState {
    pub fn new(service: SwiftService<SqliteStore>, debug: bool) -> Self {
        AppState {
            service: Arc::new(service),
            debug,
        }
    }

    fn fail(&self, err: ServiceError) -> ApiError {
        ApiError::from_service(err, self.debug)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

fn message(status: StatusCode, text: String) -> Response {
    (status, Json(MessageResponse { message: text })).into_response()
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "bad_request",
            message: message.into(),
        }
    }

    /// Map a service failure to a status; store failures hide their detail unless `debug`.
    pub fn from_service(err: ServiceError, debug: bool) -> Self {
        let kind = err.kind();
        let status = match kind {
            kind if kind.is_validation() => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {}", err);
            if debug {
                err.to_string()
            } else {
                "internal server error".to_string()
            }
        } else {
            err.to_string()
        };

        ApiError {
            status,
            error: kind.as_str(),
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            message: self.message,
        });

        (self.status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Narrow a JSON body to an object record
fn into_record(body: Value) -> Result<Record, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::bad_request("request body must be a JSON object")),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_check() -> &'static str {
    "OK"
}

/// GET /swift-codes/:swiftCode
async fn get_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let details = state
        .service
        .get_by_swift_code(&code)
        .map_err(|e| state.fail(e))?;

    Ok((StatusCode::OK, Json(details)).into_response())
}

/// GET /swift-codes/country/:iso2
async fn get_country_codes(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
) -> Result<Response, ApiError> {
    let codes = state
        .service
        .get_by_country(&country_iso2)
        .map_err(|e| state.fail(e))?;

    Ok((StatusCode::OK, Json(codes)).into_response())
}

/// POST /swift-codes
async fn create_swift_code(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let data = into_record(body)?;

    let bank = state.service.create_bank(&data).map_err(|e| state.fail(e))?;

    Ok(message(
        StatusCode::CREATED,
        format!("SWIFT code {} added successfully", bank.swift_code),
    ))
}

/// DELETE /swift-codes/:swiftCode
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    state.service.delete_bank(&code).map_err(|e| state.fail(e))?;

    Ok(message(
        StatusCode::OK,
        format!("SWIFT code {} deleted successfully", code.to_ascii_uppercase()),
    ))
}

/// POST /countries
async fn create_country(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let data = into_record(body)?;

    let country = state
        .service
        .create_country(&data)
        .map_err(|e| state.fail(e))?;

    Ok(message(
        StatusCode::CREATED,
        format!("country {} stored successfully", country.country_iso2),
    ))
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router with every route under `/{api_version}`.
pub fn router(state: AppState, api_version: &str) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/swift-codes", post(create_swift_code))
        .route(
            "/swift-codes/:swift_code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/swift-codes/country/:country_iso2", get(get_country_codes))
        .route("/countries", post(create_country))
        .with_state(state);

    Router::new()
        .nest(&format!("/{}", normalize_api_version(api_version)), api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        let service = SwiftService::new(SqliteStore::open_in_memory().unwrap());
        router(AppState::new(service, false), "v1")
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }));

        (status, value)
    }

    fn bank(code: &str, hq: bool) -> Value {
        json!({
            "address": "FOREST ZUBRA 1, FLOOR 1 WARSZAWA, MAZOWIECKIE",
            "bankName": "PEKAO TOWARZYSTWO FUNDUSZY INWESTYCYJNYCH S.A.",
            "countryISO2": "PL",
            "countryName": "POLAND",
            "isHeadquarter": hq,
            "swiftCode": code,
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "raw": "OK" }));
    }

    #[tokio::test]
    async fn test_slash_only_version_mounts_default_prefix() {
        let service = SwiftService::new(SqliteStore::open_in_memory().unwrap());
        let app = router(AppState::new(service, false), "/");

        let (status, _) = send(&app, "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_lookup_delete_flow() {
        let app = app();

        for (code, hq) in [("TPEOPLPWXXX", true), ("TPEOPLPWPAE", false), ("TPEOPLPWP65", false)] {
            let (status, body) = send(&app, "POST", "/v1/swift-codes", Some(bank(code, hq))).await;
            assert_eq!(status, StatusCode::CREATED);
            assert!(body["message"].as_str().unwrap().contains(code));
        }

        let (status, body) = send(&app, "GET", "/v1/swift-codes/TPEOPLPWXXX", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["countryName"], json!("POLAND"));
        assert_eq!(body["branches"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "GET", "/v1/swift-codes/TPEOPLPWPAE", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("branches").is_none());

        let (status, body) = send(&app, "GET", "/v1/swift-codes/country/pl", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["swiftCodes"].as_array().unwrap().len(), 3);

        let (status, _) = send(&app, "DELETE", "/v1/swift-codes/TPEOPLPWPAE", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, "GET", "/v1/swift-codes/TPEOPLPWPAE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("not_found"));
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let app = app();
        let hq = Some(bank("TPEOPLPWXXX", true));
        send(&app, "POST", "/v1/swift-codes", hq.clone()).await;

        let (status, body) = send(&app, "POST", "/v1/swift-codes", hq).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], json!("already_exists"));

        let branch_as_hq = Some(bank("TPEOPLPWPAE", true));
        let (status, body) = send(&app, "POST", "/v1/swift-codes", branch_as_hq).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("headquarter_mismatch"));

        let (status, body) = send(&app, "GET", "/v1/swift-codes/TPEO", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("bad_length"));

        let (status, _) = send(&app, "GET", "/v1/swift-codes/country/DE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_bodies() {
        let app = app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/swift-codes")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let not_an_object = Some(json!(["TPEOPLPWXXX"]));
        let (status, body) = send(&app, "POST", "/v1/swift-codes", not_an_object).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("bad_request"));
    }

    #[tokio::test]
    async fn test_create_country() {
        let app = app();
        let (status, _) = send(
            &app,
            "POST",
            "/v1/countries",
            Some(json!({
                "countryISO2": "pl",
                "countryName": "Poland",
                "timeZone": "Europe/Warsaw",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let nameless = Some(json!({ "countryISO2": "PL" }));
        let (status, body) = send(&app, "POST", "/v1/countries", nameless).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("missing_field"));
    }

    #[test]
    fn test_store_errors_hidden_unless_debug() {
        let err = || ServiceError::from(crate::error::StoreError::Unavailable("disk full".into()));

        let hidden = ApiError::from_service(err(), false);
        assert_eq!(hidden.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!hidden.message.contains("disk full"));

        let shown = ApiError::from_service(err(), true);
        assert!(shown.message.contains("disk full"));
    }
}
