use log::warn;
use std::str::FromStr;

use crate::inference::DEFAULT_MAX_PREDICTIONS;
use crate::simulation::SimulationConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_predictions: usize,
    pub simulation: SimulationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            max_predictions: DEFAULT_MAX_PREDICTIONS,
            simulation: SimulationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            workers: parse_or(&lookup, "WORKERS", defaults.workers),
            max_predictions: parse_or(&lookup, "MAX_PREDICTIONS", defaults.max_predictions),
            simulation: SimulationConfig {
                latency_min_secs: parse_or(
                    &lookup,
                    "SIM_LATENCY_MIN_SECS",
                    defaults.simulation.latency_min_secs,
                ),
                latency_max_secs: parse_or(
                    &lookup,
                    "SIM_LATENCY_MAX_SECS",
                    defaults.simulation.latency_max_secs,
                ),
                failure_probability: parse_or(
                    &lookup,
                    "SIM_FAILURE_PROBABILITY",
                    defaults.simulation.failure_probability,
                ),
            },
        };

        config
            .simulation
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid simulation settings: {}", e))?;
        if config.workers == 0 {
            anyhow::bail!("WORKERS must be at least 1");
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_bind_all_interfaces_on_5001() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:5001");
        assert_eq!(config.simulation, SimulationConfig::default());
        assert!(config.workers >= 1);
        assert_eq!(config.max_predictions, DEFAULT_MAX_PREDICTIONS);
    }

    #[test]
    fn overrides_are_applied() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8088"),
            ("WORKERS", "2"),
            ("MAX_PREDICTIONS", "500"),
            ("SIM_LATENCY_MIN_SECS", "0"),
            ("SIM_LATENCY_MAX_SECS", "0"),
            ("SIM_FAILURE_PROBABILITY", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8088);
        assert_eq!(config.workers, 2);
        assert_eq!(config.max_predictions, 500);
        assert_eq!(config.simulation, SimulationConfig::disabled());
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn inconsistent_simulation_is_an_error() {
        assert!(ServerConfig::from_lookup(lookup(&[("SIM_LATENCY_MIN_SECS", "30")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("SIM_FAILURE_PROBABILITY", "-0.5")])).is_err());
    }
}
