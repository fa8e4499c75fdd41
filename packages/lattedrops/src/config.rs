use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::dispatch::Limits;

// =============================================================================
// Client config (figment-deserialized from defaults / drops.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   drops.toml:      [relay]
//                    url = "ws://drops.example.net:4455"
//
//   env var:         DROPS_RELAY__URL=ws://...   (double underscore = nesting)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub relay: RelayFileConfig,
    #[serde(default)]
    pub limits: LimitsFileConfig,
}

/// Relay endpoint (lives under `[relay]` in drops.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayFileConfig {
    #[serde(default = "default_relay_url")]
    pub url: String,
}

impl Default for RelayFileConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
        }
    }
}

/// Upload bounds (lives under `[limits]` in drops.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsFileConfig {
    #[serde(default = "default_max_payload_mb")]
    pub max_payload_mb: usize,
    #[serde(default = "default_decode_timeout_secs")]
    pub decode_timeout_secs: u64,
}

impl Default for LimitsFileConfig {
    fn default() -> Self {
        Self {
            max_payload_mb: default_max_payload_mb(),
            decode_timeout_secs: default_decode_timeout_secs(),
        }
    }
}

impl LimitsFileConfig {
    pub fn to_limits(&self) -> Limits {
        Limits {
            max_payload_bytes: self.max_payload_mb * 1024 * 1024,
            decode_timeout: Duration::from_secs(self.decode_timeout_secs),
        }
    }
}

fn default_relay_url() -> String {
    "ws://127.0.0.1:4455".to_string()
}
fn default_max_payload_mb() -> usize {
    8
}
fn default_decode_timeout_secs() -> u64 {
    30
}

/// Build a figment that layers: defaults → drops.toml → DROPS_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `DROPS_RELAY__URL=ws://host:4455`     →  `relay.url`
///   `DROPS_LIMITS__MAX_PAYLOAD_MB=4`      →  `limits.max_payload_mb`
pub fn load_config(config_path: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(config_path))
        .merge(Env::prefixed("DROPS_").split("__"))
}
