//! # Generator Configuration
//!
//! Naming and default values used while emitting code. Every field has a
//! default, so a TOML file only needs to list what it overrides.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings that shape the emitted documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// File name of the main Python script inside the archive.
    pub entry_point: String,

    /// Suffix for reasoning-program files: `<instanceName>_<suffix>`.
    pub reasoning_suffix: String,

    /// Host used for a JID when the agent leaves it empty.
    pub default_host: String,

    /// XMPP port passed to agents without a valid port.
    pub default_port: u16,

    /// Password passed to agents without one.
    pub default_password: String,

    /// Prepend the "generated code" comment header to the main document.
    pub header: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            entry_point: "spade_code.py".to_string(),
            reasoning_suffix: "program.asl".to_string(),
            default_host: "localhost".to_string(),
            default_port: 5222,
            default_password: "password".to_string(),
            header: true,
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Name of the auxiliary reasoning document for an agent instance.
    pub fn reasoning_file_name(&self, instance_name: &str) -> String {
        format!("{}_{}", instance_name, self.reasoning_suffix)
    }
}
