use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{SearchEngine, SearchError};
use crate::models::{
    CategoriesResponse, CategoryInfo, ErrorResponse, HealthResponse, ReloadResponse, SearchOptions,
    SearchParams, SearchResponse,
};
use crate::services::{search_with_fallback, CacheKey, CatalogError, CatalogStore, SearchCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub catalog: Arc<CatalogStore>,
    pub cache: Arc<SearchCache>,
    pub default_limit: usize,
}

impl AppState {
    fn options(&self, params: &SearchParams) -> SearchOptions {
        SearchOptions {
            limit: params.limit.unwrap_or(self.default_limit),
            offset: params.offset,
            category: params.category.clone(),
        }
    }
}

/// Configure opening search and catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/openings/semantic-search", web::get().to(semantic_search))
        .route("/openings/search", web::get().to(search))
        .route("/openings/categories", web::get().to(categories))
        .route("/catalog/stats", web::get().to(catalog_stats))
        .route("/catalog/reload", web::post().to(reload_catalog));
}

fn invalid_input(err: SearchError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_input".to_string(),
        message: err.to_string(),
        status_code: 400,
    })
}

fn catalog_failure(err: CatalogError) -> HttpResponse {
    match err {
        CatalogError::NotFound(_) => HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "catalog_unavailable".to_string(),
            message: err.to_string(),
            status_code: 503,
        }),
        _ => HttpResponse::InternalServerError().json(ErrorResponse {
            error: "catalog_error".to_string(),
            message: err.to_string(),
            status_code: 500,
        }),
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.catalog.snapshot().await;
    let status = if snapshot.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_size: snapshot.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Semantic search endpoint
///
/// GET /api/v1/openings/semantic-search?q=aggressive+openings&limit=20&offset=0&category=gambits
///
/// Queries without a recognisable intent return `searchType: "no_semantic_match"`
/// with an empty result page; the caller decides what to do next.
async fn semantic_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> impl Responder {
    run_search(&state, &params, false).await
}

/// Search endpoint with text fallback
///
/// GET /api/v1/openings/search?q=queen%27s+gambit+declined
async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> impl Responder {
    run_search(&state, &params, true).await
}

async fn run_search(state: &AppState, params: &SearchParams, with_fallback: bool) -> HttpResponse {
    if let Err(errors) = params.validate() {
        tracing::info!("Validation failed for search request: q={:?}, errors={:?}", params.q, errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let options = state.options(params);
    let snapshot = state.catalog.snapshot().await;

    let cache_key = if with_fallback {
        CacheKey::chained(snapshot.version(), &params.q, &options)
    } else {
        CacheKey::semantic(snapshot.version(), &params.q, &options)
    };

    if let Some(cached) = state.cache.get(&cache_key).await {
        return HttpResponse::Ok().json(cached.as_ref());
    }

    let result = if with_fallback {
        search_with_fallback(&state.engine, &params.q, &snapshot.openings, &options)
    } else {
        state.engine.search(&params.q, &snapshot.openings, &options)
    };

    let response: SearchResponse = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::info!("Rejected search '{}': {}", params.q, e);
            return invalid_input(e);
        }
    };

    tracing::info!(
        "Search '{}' -> {} ({} of {} results)",
        params.q,
        response.search_type,
        response.results.len(),
        response.total_results
    );

    let response = Arc::new(response);
    state.cache.insert(cache_key, response.clone()).await;
    HttpResponse::Ok().json(response.as_ref())
}

/// List named categories usable as the `category` filter
async fn categories(state: web::Data<AppState>) -> impl Responder {
    let categories = state
        .engine
        .table()
        .categories()
        .map(|(name, tags)| CategoryInfo {
            name: name.to_string(),
            tags: tags.to_vec(),
        })
        .collect();

    HttpResponse::Ok().json(CategoriesResponse { categories })
}

/// Load counters for the current catalog snapshot
async fn catalog_stats(state: web::Data<AppState>) -> impl Responder {
    let snapshot = state.catalog.snapshot().await;
    HttpResponse::Ok().json(&snapshot.stats)
}

/// Reload the catalog from disk and drop cached responses
///
/// POST /api/v1/catalog/reload
async fn reload_catalog(state: web::Data<AppState>) -> impl Responder {
    match state.catalog.reload().await {
        Ok(snapshot) => {
            state.cache.invalidate_all();
            HttpResponse::Ok().json(ReloadResponse {
                success: true,
                version: snapshot.version(),
                total_records: snapshot.len(),
            })
        }
        Err(e) => {
            tracing::error!("Catalog reload failed: {}", e);
            catalog_failure(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpeningRecord;
    use actix_web::{http::StatusCode, test, App};

    fn create_opening(name: &str, moves: &str, style_tags: &[&str]) -> OpeningRecord {
        OpeningRecord {
            fen: format!("fen-{}", name),
            name: name.to_string(),
            eco: "C00".to_string(),
            moves: moves.to_string(),
            style_tags: style_tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn app_state() -> AppState {
        AppState {
            engine: Arc::new(SearchEngine::with_defaults()),
            catalog: Arc::new(CatalogStore::from_records(vec![
                create_opening("King's Gambit", "1. e4 e5 2. f4", &["Sharp", "Gambit"]),
                create_opening("French Defense", "1. e4 e6", &["Solid"]),
                create_opening("Sicilian Defense", "1. e4 c5", &["Sharp"]),
            ])),
            cache: Arc::new(SearchCache::new(100, 60)),
            default_limit: 20,
        }
    }

    macro_rules! init_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(web::scope("/api/v1").configure(configure)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_health_reports_catalog_size() {
        let app = init_app!(app_state());
        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.catalog_size, 3);
    }

    #[actix_web::test]
    async fn test_semantic_search_endpoint() {
        let app = init_app!(app_state());
        let req = test::TestRequest::get()
            .uri("/api/v1/openings/semantic-search?q=aggressive%20openings")
            .to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.search_type, "semantic_style_search");
        assert_eq!(body.total_results, 2);
        assert!(body.results.iter().all(|r| r.opening.name != "French Defense"));
    }

    #[actix_web::test]
    async fn test_semantic_search_reports_miss() {
        let app = init_app!(app_state());
        let req = test::TestRequest::get()
            .uri("/api/v1/openings/semantic-search?q=french%20defense")
            .to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.search_type, "no_semantic_match");
        assert!(body.results.is_empty());
    }

    #[actix_web::test]
    async fn test_search_falls_back_to_text() {
        let app = init_app!(app_state());
        let req = test::TestRequest::get()
            .uri("/api/v1/openings/search?q=french%20defense")
            .to_request();
        let body: SearchResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.search_type, "text_fallback");
        assert_eq!(body.results[0].opening.name, "French Defense");
    }

    #[actix_web::test]
    async fn test_rejects_invalid_params() {
        let app = init_app!(app_state());

        let req = test::TestRequest::get()
            .uri("/api/v1/openings/search?q=sharp&limit=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/v1/openings/search?q=sharp%20openings&category=wild")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_categories_listed() {
        let app = init_app!(app_state());
        let req = test::TestRequest::get().uri("/api/v1/openings/categories").to_request();
        let body: CategoriesResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.categories.iter().any(|c| c.name == "gambits"));
    }

    #[actix_web::test]
    async fn test_reload_without_source_is_unavailable() {
        let app = init_app!(app_state());
        let req = test::TestRequest::post().uri("/api/v1/catalog/reload").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
