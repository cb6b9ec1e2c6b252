//! HTTP routes.
//!
//! `/check` is the HTML front end, `/api/check` the JSON one. Rejected input
//! always gets the same generic 400 so callers cannot tell which rule failed.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, web};
use reachable_probe::{CheckResult, ReachabilityError, ReachabilityService};
use serde::Deserialize;
use tracing_attributes::instrument;
use uuid::Uuid;

const INDEX_PAGE: &str = include_str!("../assets/index.html");
const RESULT_TEMPLATE: &str = include_str!("../assets/result.html");

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    q: Option<String>,
}

impl CheckQuery {
    fn raw(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .service(
            web::resource("/check")
                .route(web::get().to(check))
                .default_service(web::to(bad_request)),
        )
        .service(
            web::resource("/api/check")
                .route(web::get().to(api_check))
                .default_service(web::to(bad_request)),
        );
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_PAGE)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type(ContentType::plaintext())
        .body("Bad Request")
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn check(
    service: web::Data<ReachabilityService>,
    query: web::Query<CheckQuery>,
) -> HttpResponse {
    let raw = query.raw();
    if raw.is_empty() {
        return HttpResponse::Found()
            .insert_header((header::LOCATION, "/"))
            .finish();
    }

    match service.check(raw).await {
        Ok(result) => {
            log_result(&result);
            HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(render_result(&result))
        }
        Err(ReachabilityError::Rejected) => {
            tracing::warn!("query rejected");
            bad_request().await
        }
    }
}

#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
async fn api_check(
    service: web::Data<ReachabilityService>,
    query: web::Query<CheckQuery>,
) -> HttpResponse {
    match service.check(query.raw()).await {
        Ok(result) => {
            log_result(&result);
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            tracing::warn!("query rejected");
            HttpResponse::BadRequest().json(e)
        }
    }
}

fn log_result(result: &CheckResult) {
    tracing::info!(
        host = %result.host,
        verdict = %result.verdict,
        elapsed_ms = result.elapsed_ms,
        "check completed"
    );
}

/// The host is inserted unescaped: a normalized host contains only
/// letters, digits, `.`, `-` and `:`.
fn render_result(result: &CheckResult) -> String {
    RESULT_TEMPLATE
        .replace("{{host}}", result.host.as_str())
        .replace("{{status}}", &result.verdict.to_string())
}
