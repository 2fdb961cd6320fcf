use actix_web::{get, post, web, HttpResponse, Responder};
use log::{debug, info, warn};
use std::time::Instant;

use crate::error::PredictionError;
use crate::inference::Predictor;
use crate::models::{ApiResponse, PredictionRequest};

const JSON_LIMIT: usize = 1024 * 1024;

#[post("/getPrediction")]
pub async fn get_prediction(
    predictor: web::Data<Predictor>,
    req: web::Json<PredictionRequest>,
) -> impl Responder {
    let start_time = Instant::now();
    info!(
        "New prediction request: {} given points, n_pred={}",
        req.given_points.len(),
        req.n_pred
    );
    debug!("Payload: {:?}", req);

    match predictor.predict(&req).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            warn!("Prediction failed: {}", e);
            e.to_response(Some(start_time.elapsed()))
        }
    }
}

#[get("/api/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::success("geo-predictor is up"))
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("endpoint not found"))
}

/// Body extraction failures (missing fields, bad JSON, wrong content type)
/// are reported as validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            warn!("Rejected request body: {}", err);
            PredictionError::validation(err.to_string()).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(get_prediction)
        .service(health_check);
}
