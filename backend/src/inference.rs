use actix_web::rt::time::sleep;
use chrono::Duration;
use log::{info, warn};

use crate::error::{PredictionError, Result};
use crate::models::{Point, PredictionRequest, PredictionResponse};
use crate::simulation::Simulator;
use crate::timestamp::Timestamp;

pub const DEFAULT_MAX_PREDICTIONS: usize = 10_000;

/// Linear extrapolation from the last two observed points. Everything that
/// can fail is checked when this is built, so a request is rejected before
/// any simulated latency is spent on it.
#[derive(Debug, Clone)]
pub struct Extrapolation {
    origin: Point,
    origin_time: Timestamp,
    delta_long: f64,
    delta_lat: f64,
    delta_time: Duration,
    n_pred: usize,
}

impl Extrapolation {
    pub fn from_request(request: &PredictionRequest, max_predictions: usize) -> Result<Self> {
        let n_pred = request.validate(max_predictions).map_err(PredictionError::Validation)?;
        let (p0, p1) = request
            .last_two()
            .ok_or_else(|| PredictionError::validation("given_points needs at least 2 points"))?;

        let t0 = Timestamp::parse(&p0.timestamp).map_err(PredictionError::Validation)?;
        let t1 = Timestamp::parse(&p1.timestamp).map_err(PredictionError::Validation)?;
        let delta_time = t1.signed_duration_since(&t0).map_err(PredictionError::Validation)?;

        let extrapolation = Extrapolation {
            origin: p1.clone(),
            origin_time: t1,
            delta_long: p1.long - p0.long,
            delta_lat: p1.lat - p0.lat,
            delta_time,
            n_pred,
        };
        if n_pred > 0 {
            extrapolation.point_at(n_pred)?;
        }
        Ok(extrapolation)
    }

    /// The point `step` deltas past the last observed one (`step >= 1`).
    fn point_at(&self, step: usize) -> Result<Point> {
        let out_of_range = || PredictionError::validation(format!("prediction {} is out of range", step));

        let step_i32 = i32::try_from(step).map_err(|_| out_of_range())?;
        let point_id = i64::try_from(step)
            .ok()
            .and_then(|s| self.origin.point_id.checked_add(s))
            .ok_or_else(out_of_range)?;
        let timestamp = self
            .delta_time
            .checked_mul(step_i32)
            .and_then(|delta| self.origin_time.checked_add(delta))
            .ok_or_else(out_of_range)?;

        let factor = step as f64;
        Ok(Point {
            point_id,
            long: self.origin.long + self.delta_long * factor,
            lat: self.origin.lat + self.delta_lat * factor,
            timestamp: timestamp.to_iso8601(),
            speed: self.origin.speed,
        })
    }

    pub fn points(&self) -> Result<Vec<Point>> {
        (1..=self.n_pred).map(|step| self.point_at(step)).collect()
    }
}

/// Handler object behind `/getPrediction`: one per server, shared by all workers.
pub struct Predictor {
    simulator: Simulator,
    max_predictions: usize,
}

impl Predictor {
    pub fn new(simulator: Simulator) -> Self {
        Predictor { simulator, max_predictions: DEFAULT_MAX_PREDICTIONS }
    }

    /// Caps `n_pred`; larger requests are rejected before any work is done.
    pub fn with_max_predictions(mut self, max_predictions: usize) -> Self {
        self.max_predictions = max_predictions;
        self
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let extrapolation = Extrapolation::from_request(request, self.max_predictions)?;

        let latency = self.simulator.draw_latency();
        info!("Waiting for {} seconds", latency.as_secs());
        if !latency.is_zero() {
            sleep(latency).await;
        }

        if self.simulator.should_fail() {
            warn!("Injecting simulated failure");
            return Err(PredictionError::SimulatedFailure);
        }

        let pred_points = extrapolation.points()?;
        info!("Predicted {} points", pred_points.len());
        Ok(PredictionResponse { pred_points })
    }
}
