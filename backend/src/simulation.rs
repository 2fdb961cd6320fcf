use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

pub const DEFAULT_LATENCY_MIN_SECS: u64 = 1;
pub const DEFAULT_LATENCY_MAX_SECS: u64 = 20;
pub const DEFAULT_FAILURE_PROBABILITY: f64 = 0.1;

/// Knobs for the simulated backend: how long a prediction "takes" and how
/// often it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub latency_min_secs: u64,
    pub latency_max_secs: u64,
    pub failure_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            latency_min_secs: DEFAULT_LATENCY_MIN_SECS,
            latency_max_secs: DEFAULT_LATENCY_MAX_SECS,
            failure_probability: DEFAULT_FAILURE_PROBABILITY,
        }
    }
}

impl SimulationConfig {
    /// No delay, never fails.
    pub fn disabled() -> Self {
        SimulationConfig {
            latency_min_secs: 0,
            latency_max_secs: 0,
            failure_probability: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.latency_min_secs > self.latency_max_secs {
            return Err(format!(
                "latency range is empty ({}s > {}s)",
                self.latency_min_secs, self.latency_max_secs
            ));
        }
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(format!(
                "failure probability must be between 0 and 1 (value: {})",
                self.failure_probability
            ));
        }
        Ok(())
    }
}

/// Draws latencies and failure decisions from a single random source.
pub struct Simulator {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible sequence of draws, for tests.
    pub fn seeded(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        Simulator { config, rng: Mutex::new(rng) }
    }

    pub fn draw_latency(&self) -> Duration {
        let (min, max) = (self.config.latency_min_secs, self.config.latency_max_secs);
        if min == max {
            return Duration::from_secs(min);
        }
        let secs = self.with_locked_rng(|rng| rng.gen_range(min..=max));
        Duration::from_secs(secs)
    }

    pub fn should_fail(&self) -> bool {
        let p = self.config.failure_probability;
        if p <= 0.0 {
            return false;
        }
        self.with_locked_rng(|rng| rng.gen::<f64>()) < p
    }

    fn with_locked_rng<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        // rng state stays valid after a poisoning panic
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        draw(&mut guard)
    }
}
