// Plate Catalog - REST API with Axum
//
// GET  /plates                  page of plates (query: pageNumber, pageSize, sortOrder, filterString, isForSale)
// POST /plates                  add a plate
// PUT  /plates/MarkAsSold/:id   mark a plate as sold
// POST /plates/ApplyMarkup      reprice every plate at purchase * 1.20

use crate::error::CatalogError;
use crate::plate::PlateTransfer;
use crate::service::PlateService;
use crate::store::PlateStore;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;
use uuid::Uuid;

pub type SharedStore = Arc<dyn PlateStore + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    plates: Arc<PlateService<SharedStore>>,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        AppState {
            plates: Arc::new(PlateService::new(store)),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
}

/// Handler error mapped onto a status code
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal,
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(message) => ApiError::BadRequest(message),
            // detail already logged by the service
            CatalogError::PriceOverflow(_) | CatalogError::Store(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "NOT_FOUND", m),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".to_string(),
            ),
        };

        let body = ErrorBody {
            success: false,
            code,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    page_number: Option<u32>,
    page_size: Option<u32>,
    sort_order: Option<String>,
    filter_string: Option<String>,
    is_for_sale: Option<bool>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /plates
async fn get_plates(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PlateTransfer>>, ApiError> {
    let plates = state.plates.list(
        params.page_number.unwrap_or(1),
        params.page_size.unwrap_or(10),
        params.sort_order.as_deref(),
        params.filter_string.as_deref(),
        params.is_for_sale,
    )?;

    Ok(Json(plates))
}

/// POST /plates
async fn add_plate(
    State(state): State<AppState>,
    body: Option<Json<PlateTransfer>>,
) -> Result<Json<PlateTransfer>, ApiError> {
    let transfer = body.map(|Json(t)| t);
    let created = state.plates.add(transfer.as_ref())?;
    Ok(Json(created))
}

/// PUT /plates/MarkAsSold/:id
async fn mark_plate_as_sold(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("invalid plate id {:?}", id)))?;

    if state.plates.mark_as_sold(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Plate not found.".to_string()))
    }
}

/// POST /plates/ApplyMarkup
async fn apply_markup(State(state): State<AppState>) -> Result<Json<Vec<PlateTransfer>>, ApiError> {
    let plates = state.plates.apply_markup().map_err(|e| {
        error!(error = %e, "markup request failed");
        e
    })?;

    Ok(Json(plates))
}

/// Build the application router, nested under `path_base` when given
pub fn router(state: AppState, path_base: Option<&str>) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/plates", get(get_plates).post(add_plate))
        .route("/plates/MarkAsSold/:id", put(mark_plate_as_sold))
        .route("/plates/ApplyMarkup", post(apply_markup))
        .with_state(state);

    let app = match path_base {
        Some(base) => Router::new().nest(base, routes),
        None => routes,
    };

    app.layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::Plate;
    use crate::store::InMemoryPlateStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    fn seeded() -> (InMemoryPlateStore, Vec<Plate>) {
        let plates = vec![
            Plate::new("ABC123", Decimal::new(100, 0), Decimal::new(120, 0)),
            Plate::new("XYZ789", Decimal::new(200, 0), Decimal::new(240, 0)).with_for_sale(false),
            Plate::new("LMN456", Decimal::new(300, 0), Decimal::new(360, 0)),
        ];
        (InMemoryPlateStore::with_plates(plates.clone()), plates)
    }

    fn app(store: InMemoryPlateStore) -> Router {
        router(AppState::new(Arc::new(store)), None)
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        app.oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (store, _) = seeded();
        let response = send(app(store), Method::GET, "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["data"], "OK");
    }

    #[tokio::test]
    async fn test_get_plates_with_query() {
        let (store, _) = seeded();
        let response = send(
            app(store),
            Method::GET,
            "/plates?pageNumber=1&pageSize=2&sortOrder=desc&isForSale=true",
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        let plates = body.as_array().unwrap();
        assert_eq!(plates.len(), 2);
        assert_eq!(plates[0]["registration"], "LMN456");
        assert_eq!(plates[1]["registration"], "ABC123");
        assert!(plates[0].get("id").is_none());
    }

    #[tokio::test]
    async fn test_get_plates_defaults_to_first_page_of_ten() {
        let (store, _) = seeded();
        let response = send(app(store), Method::GET, "/plates", None).await;

        assert_eq!(json(response).await.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_get_plates_rejects_page_zero() {
        let (store, _) = seeded();
        let response = send(app(store), Method::GET, "/plates?pageNumber=0", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_plate() {
        let (store, _) = seeded();
        let response = send(
            app(store.clone()),
            Method::POST,
            "/plates",
            Some(r#"{"registration":"NEW123","purchasePrice":150,"salePrice":180}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["registration"], "NEW123");
        assert_eq!(store.count().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_add_plate_without_body_is_bad_request() {
        let (store, _) = seeded();
        let response = send(app(store.clone()), Method::POST, "/plates", None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_mark_as_sold() {
        let (store, plates) = seeded();
        let uri = format!("/plates/MarkAsSold/{}", plates[0].id);

        let response = send(app(store.clone()), Method::PUT, &uri, None).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!store.fetch_by_id(plates[0].id).unwrap().unwrap().is_for_sale);
    }

    #[tokio::test]
    async fn test_mark_as_sold_unknown_and_invalid_ids() {
        let (store, _) = seeded();

        let unknown = format!("/plates/MarkAsSold/{}", Uuid::new_v4());
        let response = send(app(store.clone()), Method::PUT, &unknown, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(app(store), Method::PUT, "/plates/MarkAsSold/not-a-uuid", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_apply_markup() {
        let store = InMemoryPlateStore::with_plates(vec![Plate::new(
            "ABC123",
            Decimal::new(200, 0),
            Decimal::ZERO,
        )]);

        let response = send(app(store), Method::POST, "/plates/ApplyMarkup", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        let sale: Decimal = body[0]["salePrice"].as_str().unwrap().parse().unwrap();
        assert_eq!(sale, Decimal::new(240, 0));
    }

    #[tokio::test]
    async fn test_apply_markup_overflow_is_internal_error() {
        let store = InMemoryPlateStore::with_plates(vec![Plate::new(
            "BIG1",
            Decimal::MAX,
            Decimal::ZERO,
        )]);

        let response = send(app(store.clone()), Method::POST, "/plates/ApplyMarkup", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.fetch_all().unwrap()[0].sale_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_path_base_nesting() {
        let (store, _) = seeded();
        let app = router(AppState::new(Arc::new(store)), Some("/catalog"));

        let response = send(app.clone(), Method::GET, "/catalog/plates", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(app, Method::GET, "/plates", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
