//! Configuration loading via `ortho-config`.
//!
//! [`FleetgenConfig`] names the inventory document, every generated artifact,
//! and the external key-copy program. Values merge defaults, `fleetgen.toml`
//! discovery, and `FLEETGEN_*` environment variables.
//!
//! The environment layer types its values before they reach serde, so
//! `FLEETGEN_SSH_COPY_ID_BIN=true` arrives as a boolean and
//! `FLEETGEN_AUTOGEN_MARKER=1` as an integer. String fields accept such
//! scalars and store their canonical text. Numbers are re-rendered, so
//! `007` becomes `7` and `1.50` becomes `1.5`; wrap such values in double
//! quotes (`FLEETGEN_AUTOGEN_MARKER='"007"'`) or set them in `fleetgen.toml`.

use std::fmt;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::preamble::DEFAULT_MARKER;
use crate::prometheus::DEFAULT_HEALTHCHECK_PORT;
use crate::provision::DEFAULT_SSH_COPY_ID_BIN;
use crate::regenerate::OutputTargets;

/// Paths and settings for a regeneration run.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "FLEETGEN",
    discovery(
        app_name = "fleetgen",
        env_var = "FLEETGEN_CONFIG_PATH",
        config_file_name = "fleetgen.toml",
        dotfile_name = ".fleetgen.toml",
        project_file_name = "fleetgen.toml"
    )
)]
pub struct FleetgenConfig {
    /// YAML document listing servers and instances.
    #[ortho_config(default = "servers.yaml".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub inventory_path: String,
    /// OpenSSH client configuration to regenerate.
    #[ortho_config(default = "/root/.ssh/config".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub ssh_config_path: String,
    /// Ansible inventory to regenerate.
    #[ortho_config(default = "/etc/ansible/hosts".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub ansible_inventory_path: String,
    /// Prometheus configuration to overwrite.
    #[ortho_config(default = "/root/prometheus.yml".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub prometheus_config_path: String,
    /// Existing directory receiving the dashboard JSON files.
    #[ortho_config(default = "/var/lib/grafana-dashboards".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub grafana_dashboards_dir: String,
    /// Directory holding `<project>.json` panel templates.
    #[ortho_config(default = "/root/nodes".to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub grafana_panels_dir: String,
    /// Program used to install SSH keys.
    #[ortho_config(default = DEFAULT_SSH_COPY_ID_BIN.to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub ssh_copy_id_bin: String,
    /// Port of the healthcheck exporter scraped on every server.
    #[ortho_config(default = DEFAULT_HEALTHCHECK_PORT)]
    pub healthcheck_port: u16,
    /// Line separating hand-written content from generated content.
    #[ortho_config(default = DEFAULT_MARKER.to_owned())]
    #[serde(deserialize_with = "scalar_text")]
    pub autogen_marker: String,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarTextVisitor)
}

struct ScalarTextVisitor;

impl Visitor<'_> for ScalarTextVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_char<E: de::Error>(self, value: char) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_f32<E: de::Error>(self, value: f32) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to fleetgen.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const STRING_FIELDS: [FieldMetadata; 8] = [
    FieldMetadata::new("inventory path", "FLEETGEN_INVENTORY_PATH", "inventory_path"),
    FieldMetadata::new("SSH config path", "FLEETGEN_SSH_CONFIG_PATH", "ssh_config_path"),
    FieldMetadata::new(
        "Ansible inventory path",
        "FLEETGEN_ANSIBLE_INVENTORY_PATH",
        "ansible_inventory_path",
    ),
    FieldMetadata::new(
        "Prometheus config path",
        "FLEETGEN_PROMETHEUS_CONFIG_PATH",
        "prometheus_config_path",
    ),
    FieldMetadata::new(
        "Grafana dashboards directory",
        "FLEETGEN_GRAFANA_DASHBOARDS_DIR",
        "grafana_dashboards_dir",
    ),
    FieldMetadata::new(
        "Grafana panel templates directory",
        "FLEETGEN_GRAFANA_PANELS_DIR",
        "grafana_panels_dir",
    ),
    FieldMetadata::new("ssh-copy-id program", "FLEETGEN_SSH_COPY_ID_BIN", "ssh_copy_id_bin"),
    FieldMetadata::new("autogenerated marker", "FLEETGEN_AUTOGEN_MARKER", "autogen_marker"),
];

impl FleetgenConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("fleetgen")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages name the environment
    /// variable and `fleetgen.toml` key that supply the offending value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a string field is blank and
    /// [`ConfigError::InvalidPort`] when the healthcheck port is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            &self.inventory_path,
            &self.ssh_config_path,
            &self.ansible_inventory_path,
            &self.prometheus_config_path,
            &self.grafana_dashboards_dir,
            &self.grafana_panels_dir,
            &self.ssh_copy_id_bin,
            &self.autogen_marker,
        ];
        if let Some((_, metadata)) = values
            .iter()
            .zip(STRING_FIELDS.iter())
            .find(|(value, _)| value.trim().is_empty())
        {
            return Err(metadata.missing());
        }
        if self.healthcheck_port == 0 {
            return Err(ConfigError::InvalidPort(String::from(
                "healthcheck port must be between 1 and 65535: set FLEETGEN_HEALTHCHECK_PORT or add healthcheck_port to fleetgen.toml",
            )));
        }
        Ok(())
    }

    /// Path of the inventory document.
    #[must_use]
    pub fn inventory_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.inventory_path)
    }

    /// Directory searched for panel templates.
    #[must_use]
    pub fn panels_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.grafana_panels_dir)
    }

    /// Resolves the artifact destinations after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`FleetgenConfig::validate`].
    pub fn output_targets(&self) -> Result<OutputTargets, ConfigError> {
        self.validate()?;
        Ok(OutputTargets {
            ssh_config: Utf8PathBuf::from(&self.ssh_config_path),
            ansible_inventory: Utf8PathBuf::from(&self.ansible_inventory_path),
            prometheus_config: Utf8PathBuf::from(&self.prometheus_config_path),
            grafana_dashboards: Utf8PathBuf::from(&self.grafana_dashboards_dir),
            marker: self.autogen_marker.clone(),
            healthcheck_port: self.healthcheck_port,
        })
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the healthcheck port is unusable.
    #[error("invalid configuration value: {0}")]
    InvalidPort(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
