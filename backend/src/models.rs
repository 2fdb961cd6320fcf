use serde::{Deserialize, Serialize};

/// A single geotemporal sample.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Point {
    pub point_id: i64,
    pub long: f64,
    pub lat: f64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictionRequest {
    pub given_points: Vec<Point>,
    pub n_pred: i64,
}

impl PredictionRequest {
    /// Checks everything that can be rejected without touching the simulation.
    /// Timestamps are checked later when the extrapolation parses them.
    pub fn validate(&self, max_predictions: usize) -> Result<usize, String> {
        if self.n_pred < 0 {
            return Err(format!("n_pred must be non-negative (value: {})", self.n_pred));
        }
        if self.n_pred as u64 > max_predictions as u64 {
            return Err(format!(
                "n_pred must be at most {} (value: {})",
                max_predictions, self.n_pred
            ));
        }
        if self.given_points.len() < 2 {
            return Err(format!(
                "given_points needs at least 2 points to extrapolate (got {})",
                self.given_points.len()
            ));
        }
        usize::try_from(self.n_pred).map_err(|_| format!("n_pred is too large (value: {})", self.n_pred))
    }

    pub fn last_two(&self) -> Option<(&Point, &Point)> {
        match self.given_points.as_slice() {
            [.., p0, p1] => Some((p0, p1)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub pred_points: Vec<Point>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }
}
