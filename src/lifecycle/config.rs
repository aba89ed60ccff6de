//! # Restaurant Configuration
//!
//! [`RestaurantConfig`] fixes the shape and pacing of a run. It is immutable once the
//! [`Restaurant`](crate::lifecycle::Restaurant) is built.
//!
//! Configs are usually built in code with the `with_*` setters, or read from the
//! environment:
//!
//! | Variable                          | Field              | Default |
//! |-----------------------------------|--------------------|---------|
//! | `RESTAURANT_KITCHEN_SIZE`         | `kitchen_size`     | 3       |
//! | `RESTAURANT_WAITERS`              | `waiter_count`     | 4       |
//! | `RESTAURANT_DELIVERY_DELAY_MS`    | `delivery_delay`   | 500 ms  |
//! | `RESTAURANT_MONITOR_INTERVAL_MS`  | `monitor_interval` | 5 s     |

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building or validating a [`RestaurantConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestaurantConfig {
    /// Cooks working in parallel.
    pub kitchen_size: usize,
    /// Waiters taking orders.
    pub waiter_count: usize,
    /// Time from picking up a ready order to serving it.
    pub delivery_delay: Duration,
    /// Period between pipeline snapshots.
    pub monitor_interval: Duration,
    /// Longest the dispatcher blocks on an empty queue before re-checking for stop.
    pub dispatch_poll_interval: Duration,
    /// How long `stop()` waits for each waiter to finish its shift.
    pub waiter_join_timeout: Duration,
    /// How long `stop()` lets the kitchen finish outstanding orders.
    pub kitchen_drain_timeout: Duration,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            kitchen_size: 3,
            waiter_count: 4,
            delivery_delay: Duration::from_millis(500),
            monitor_interval: Duration::from_secs(5),
            dispatch_poll_interval: Duration::from_secs(1),
            waiter_join_timeout: Duration::from_secs(3),
            kitchen_drain_timeout: Duration::from_secs(5),
        }
    }
}

impl RestaurantConfig {
    pub fn new(kitchen_size: usize, waiter_count: usize) -> Self {
        Self {
            kitchen_size,
            waiter_count,
            ..Self::default()
        }
    }

    pub fn with_delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = delay;
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    pub fn with_dispatch_poll_interval(mut self, interval: Duration) -> Self {
        self.dispatch_poll_interval = interval;
        self
    }

    pub fn with_waiter_join_timeout(mut self, timeout: Duration) -> Self {
        self.waiter_join_timeout = timeout;
        self
    }

    pub fn with_kitchen_drain_timeout(mut self, timeout: Duration) -> Self {
        self.kitchen_drain_timeout = timeout;
        self
    }

    /// Reads overrides from the process environment on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(size) = parse(&lookup, "RESTAURANT_KITCHEN_SIZE")? {
            config.kitchen_size = size;
        }
        if let Some(count) = parse(&lookup, "RESTAURANT_WAITERS")? {
            config.waiter_count = count;
        }
        if let Some(ms) = parse(&lookup, "RESTAURANT_DELIVERY_DELAY_MS")? {
            config.delivery_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse(&lookup, "RESTAURANT_MONITOR_INTERVAL_MS")? {
            config.monitor_interval = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kitchen_size == 0 {
            return Err(ConfigError::Zero("kitchen_size"));
        }
        if self.waiter_count == 0 {
            return Err(ConfigError::Zero("waiter_count"));
        }
        if self.monitor_interval.is_zero() {
            return Err(ConfigError::Zero("monitor_interval"));
        }
        if self.dispatch_poll_interval.is_zero() {
            return Err(ConfigError::Zero("dispatch_poll_interval"));
        }
        Ok(())
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                var: var.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_match_house_rules() {
        let config = RestaurantConfig::default();
        assert_eq!(config.kitchen_size, 3);
        assert_eq!(config.waiter_count, 4);
        assert_eq!(config.delivery_delay, Duration::from_millis(500));
        assert_eq!(config.waiter_join_timeout, Duration::from_secs(3));
        assert_eq!(config.kitchen_drain_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_overrides() {
        let config = RestaurantConfig::from_lookup(lookup(&[
            ("RESTAURANT_KITCHEN_SIZE", "1"),
            ("RESTAURANT_WAITERS", " 6 "),
            ("RESTAURANT_DELIVERY_DELAY_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.kitchen_size, 1);
        assert_eq!(config.waiter_count, 6);
        assert_eq!(config.delivery_delay, Duration::from_millis(250));
        assert_eq!(config.monitor_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = RestaurantConfig::from_lookup(lookup(&[("RESTAURANT_WAITERS", "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "RESTAURANT_WAITERS".into(),
                value: "many".into(),
            }
        );

        let err = RestaurantConfig::from_lookup(lookup(&[("RESTAURANT_KITCHEN_SIZE", "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero("kitchen_size"));
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: RestaurantConfig =
            serde_json::from_str(r#"{ "kitchen_size": 2, "waiter_count": 5 }"#).unwrap();
        assert_eq!(config, RestaurantConfig::new(2, 5));
    }
}
