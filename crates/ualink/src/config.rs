// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use ualink::config::{BrowseMode, UaClientConfig};
//!
//! let config = UaClientConfig::builder()
//!     .endpoint("opc.tcp://plc-01:4840")
//!     .connect_timeout(Duration::from_secs(2))
//!     .browse_mode(BrowseMode::Lenient)
//!     .simulation_seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.simulation.catalog_size, 10);
//! ```
//!
//! The same configuration as TOML:
//!
//! ```toml
//! endpoint = "opc.tcp://plc-01:4840"
//! connect_timeout = "2s"
//! browse_mode = "lenient"
//!
//! [simulation]
//! seed = 7
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigurationError, UaError, UaResult};

/// Largest simulated catalog accepted by validation.
pub const MAX_CATALOG_SIZE: usize = 1000;

// =============================================================================
// BrowseMode
// =============================================================================

/// Which children of the Objects folder count as browse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BrowseMode {
    /// Variable-class nodes only.
    #[default]
    Strict,

    /// Every child outside namespace 0, except the reserved `Server` object.
    Lenient,
}

// =============================================================================
// SimulationSettings
// =============================================================================

/// Settings for the simulation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of fabricated variables.
    pub catalog_size: usize,

    /// Namespace index used for fabricated node ids.
    pub namespace_index: u16,

    /// Lower bound of generated values (inclusive).
    pub value_min: i64,

    /// Upper bound of generated values (inclusive).
    pub value_max: i64,

    /// Fixed RNG seed. `None` seeds from OS entropy.
    ///
    /// Signed because TOML integers are 64-bit signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            catalog_size: 10,
            namespace_index: 2,
            value_min: 0,
            value_max: 100,
            seed: None,
        }
    }
}

impl SimulationSettings {
    /// Settings with a fixed seed, everything else default.
    pub fn seeded(seed: i64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Returns settings the simulation can always run with.
    ///
    /// The catalog size is clamped to `1..=MAX_CATALOG_SIZE` and an inverted
    /// value range is swapped. Each correction is logged.
    pub fn normalized(mut self) -> Self {
        let catalog_size = self.catalog_size.clamp(1, MAX_CATALOG_SIZE);
        if catalog_size != self.catalog_size {
            warn!(
                requested = self.catalog_size,
                using = catalog_size,
                "Simulated catalog size out of range"
            );
            self.catalog_size = catalog_size;
        }
        if self.value_min > self.value_max {
            warn!(
                value_min = self.value_min,
                value_max = self.value_max,
                "Simulated value range inverted, swapping bounds"
            );
            std::mem::swap(&mut self.value_min, &mut self.value_max);
        }
        self
    }

    fn validate(&self) -> UaResult<()> {
        if self.catalog_size == 0 || self.catalog_size > MAX_CATALOG_SIZE {
            return Err(UaError::configuration(ConfigurationError::invalid_simulation(
                format!(
                    "catalog_size must be between 1 and {}, got {}",
                    MAX_CATALOG_SIZE, self.catalog_size
                ),
            )));
        }
        if self.value_min > self.value_max {
            return Err(UaError::configuration(ConfigurationError::invalid_simulation(
                format!(
                    "value_min ({}) is greater than value_max ({})",
                    self.value_min, self.value_max
                ),
            )));
        }
        Ok(())
    }
}

// =============================================================================
// UaClientConfig
// =============================================================================

/// Configuration for [`crate::client::UaClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UaClientConfig {
    /// Endpoint used by `connect_configured`.
    pub endpoint: String,

    /// Application name announced to the server.
    pub application_name: String,

    /// Application URI. Derived from the name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_uri: Option<String>,

    /// Deadline for the real connection attempt before falling back.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Session timeout requested from the server.
    #[serde(with = "humantime_serde")]
    pub session_timeout: Duration,

    /// Accept server certificates without a trust store.
    pub trust_server_certs: bool,

    /// Browse result filtering.
    pub browse_mode: BrowseMode,

    /// Simulation backend settings.
    pub simulation: SimulationSettings,
}

fn default_endpoint() -> String {
    "opc.tcp://localhost:4840".to_string()
}

fn default_application_name() -> String {
    "ualink OPC UA Client".to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for UaClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            application_name: default_application_name(),
            application_uri: None,
            connect_timeout: default_connect_timeout(),
            session_timeout: default_session_timeout(),
            trust_server_certs: true,
            browse_mode: BrowseMode::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl UaClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> UaClientConfigBuilder {
        UaClientConfigBuilder::default()
    }

    /// Validates this configuration.
    pub fn validate(&self) -> UaResult<()> {
        if !self.endpoint.starts_with("opc.tcp://") {
            return Err(UaError::configuration(ConfigurationError::invalid_endpoint(
                &self.endpoint,
                "Endpoint must start with opc.tcp://",
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(UaError::configuration(ConfigurationError::invalid_timeout(
                self.connect_timeout,
                "Connect timeout must be greater than 0",
            )));
        }

        if self.session_timeout.is_zero() {
            return Err(UaError::configuration(ConfigurationError::invalid_timeout(
                self.session_timeout,
                "Session timeout must be greater than 0",
            )));
        }

        self.simulation.validate()
    }

    /// Returns the effective application URI.
    pub fn effective_application_uri(&self) -> String {
        self.application_uri.clone().unwrap_or_else(|| {
            format!("urn:ualink:{}", self.application_name.replace(' ', ""))
        })
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> UaResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            UaError::configuration(ConfigurationError::load("<string>", e.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> UaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            UaError::configuration(ConfigurationError::load(
                path.display().to_string(),
                e.to_string(),
            ))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            UaError::configuration(ConfigurationError::load(
                path.display().to_string(),
                e.to_string(),
            ))
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), endpoint = %config.endpoint, "Loaded client configuration");
        Ok(config)
    }

    /// Renders this configuration as TOML.
    pub fn to_toml_string(&self) -> UaResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            UaError::configuration(ConfigurationError::load("<serialize>", e.to_string()))
        })
    }
}

// =============================================================================
// UaClientConfigBuilder
// =============================================================================

/// Builder for [`UaClientConfig`].
#[derive(Debug, Default)]
pub struct UaClientConfigBuilder {
    endpoint: Option<String>,
    application_name: Option<String>,
    application_uri: Option<String>,
    connect_timeout: Option<Duration>,
    session_timeout: Option<Duration>,
    trust_server_certs: Option<bool>,
    browse_mode: Option<BrowseMode>,
    simulation: Option<SimulationSettings>,
}

impl UaClientConfigBuilder {
    /// Sets the default endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Sets the application URI.
    pub fn application_uri(mut self, uri: impl Into<String>) -> Self {
        self.application_uri = Some(uri.into());
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the session timeout.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Sets whether server certificates are trusted without a store.
    pub fn trust_server_certs(mut self, trust: bool) -> Self {
        self.trust_server_certs = Some(trust);
        self
    }

    /// Sets the browse filtering mode.
    pub fn browse_mode(mut self, mode: BrowseMode) -> Self {
        self.browse_mode = Some(mode);
        self
    }

    /// Replaces the simulation settings.
    pub fn simulation(mut self, settings: SimulationSettings) -> Self {
        self.simulation = Some(settings);
        self
    }

    /// Fixes the simulation RNG seed.
    pub fn simulation_seed(mut self, seed: i64) -> Self {
        self.simulation.get_or_insert_with(SimulationSettings::default).seed = Some(seed);
        self
    }

    /// Sets the simulated catalog size.
    pub fn catalog_size(mut self, size: usize) -> Self {
        self.simulation
            .get_or_insert_with(SimulationSettings::default)
            .catalog_size = size;
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> UaResult<UaClientConfig> {
        let config = UaClientConfig {
            endpoint: self.endpoint.unwrap_or_else(default_endpoint),
            application_name: self.application_name.unwrap_or_else(default_application_name),
            application_uri: self.application_uri,
            connect_timeout: self.connect_timeout.unwrap_or_else(default_connect_timeout),
            session_timeout: self.session_timeout.unwrap_or_else(default_session_timeout),
            trust_server_certs: self.trust_server_certs.unwrap_or(true),
            browse_mode: self.browse_mode.unwrap_or_default(),
            simulation: self.simulation.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = UaClientConfig::default();
        assert_eq!(config.endpoint, "opc.tcp://localhost:4840");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.browse_mode, BrowseMode::Strict);
        assert_eq!(config.simulation.catalog_size, 10);
        assert_eq!(config.simulation.value_min, 0);
        assert_eq!(config.simulation.value_max, 100);
        assert!(config.simulation.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = UaClientConfig::builder()
            .endpoint("opc.tcp://10.0.0.5:4840")
            .application_name("Line Monitor")
            .browse_mode(BrowseMode::Lenient)
            .catalog_size(4)
            .simulation_seed(99)
            .build()
            .unwrap();

        assert_eq!(config.endpoint, "opc.tcp://10.0.0.5:4840");
        assert_eq!(config.browse_mode, BrowseMode::Lenient);
        assert_eq!(config.simulation.catalog_size, 4);
        assert_eq!(config.simulation.seed, Some(99));
        assert_eq!(config.effective_application_uri(), "urn:ualink:LineMonitor");
    }

    #[test]
    fn test_validation_failures() {
        assert!(UaClientConfig::builder().endpoint("http://localhost").build().is_err());
        assert!(UaClientConfig::builder()
            .connect_timeout(Duration::ZERO)
            .build()
            .is_err());
        assert!(UaClientConfig::builder().catalog_size(0).build().is_err());
        assert!(UaClientConfig::builder()
            .catalog_size(MAX_CATALOG_SIZE + 1)
            .build()
            .is_err());

        let inverted = SimulationSettings {
            value_min: 10,
            value_max: 1,
            ..Default::default()
        };
        let err = UaClientConfig::builder().simulation(inverted).build().unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_simulation_normalized() {
        let fixed = SimulationSettings {
            catalog_size: 0,
            value_min: 10,
            value_max: 1,
            ..Default::default()
        }
        .normalized();
        assert_eq!(fixed.catalog_size, 1);
        assert_eq!((fixed.value_min, fixed.value_max), (1, 10));

        let huge = SimulationSettings {
            catalog_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(huge.normalized().catalog_size, MAX_CATALOG_SIZE);

        let valid = SimulationSettings::seeded(3);
        assert_eq!(valid.clone().normalized(), valid);
    }

    #[test]
    fn test_extreme_seed_round_trips() {
        for seed in [i64::MIN, -1, i64::MAX] {
            let config = UaClientConfig::builder().simulation_seed(seed).build().unwrap();
            let text = config.to_toml_string().unwrap();
            assert_eq!(UaClientConfig::from_toml_str(&text).unwrap(), config);
        }
    }

    #[test]
    fn test_from_toml_str() {
        let config = UaClientConfig::from_toml_str(
            r#"
            endpoint = "opc.tcp://plc-01:4840"
            connect_timeout = "750ms"
            browse_mode = "lenient"

            [simulation]
            catalog_size = 3
            seed = 42
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "opc.tcp://plc-01:4840");
        assert_eq!(config.connect_timeout, Duration::from_millis(750));
        assert_eq!(config.session_timeout, Duration::from_secs(60));
        assert_eq!(config.browse_mode, BrowseMode::Lenient);
        assert_eq!(config.simulation.catalog_size, 3);
        assert_eq!(config.simulation.value_max, 100);
        assert_eq!(config.simulation.seed, Some(42));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = UaClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, UaClientConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = UaClientConfig::builder().simulation_seed(5).build().unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(UaClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"opc.tcp://127.0.0.1:48010\"").unwrap();
        writeln!(file, "trust_server_certs = false").unwrap();

        let config = UaClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, "opc.tcp://127.0.0.1:48010");
        assert!(!config.trust_server_certs);

        let missing = UaClientConfig::from_file("/nonexistent/ualink.toml");
        assert!(missing.is_err());
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let err = UaClientConfig::from_toml_str("catalog = [").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }
}
