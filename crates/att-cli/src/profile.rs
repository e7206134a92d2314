use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Where and as whom the CLI connects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionProfile {
    pub ledger_path: PathBuf,
    pub channel: String,
    pub identity: String,
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("att-ledger.json"),
            channel: "att-documents".into(),
            identity: "degov".into(),
        }
    }
}

impl ConnectionProfile {
    /// Load a TOML profile. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing profile {}", path.display()))
    }

    /// Profile from an optional file, with an optional ledger override.
    pub fn resolve(path: Option<&Path>, ledger: Option<&Path>) -> anyhow::Result<Self> {
        let mut profile = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(ledger) = ledger {
            profile.ledger_path = ledger.to_path_buf();
        }
        Ok(profile)
    }
}
