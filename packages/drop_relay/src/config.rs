use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

// =============================================================================
// Relay config (figment-deserialized from defaults / relay.toml / env vars)
// =============================================================================
//
// Two equivalent ways to configure:
//
//   relay.toml:      [server]
//                    port = 4455
//
//   env var:         DROP_RELAY_SERVER__PORT=4455   (double underscore = nesting)

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub limits: LimitsFileConfig,
}

/// Bind address knobs (lives under `[server]` in relay.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Payload bounds (lives under `[limits]` in relay.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LimitsFileConfig {
    #[serde(default = "default_max_payload_mb")]
    pub max_payload_mb: usize,
}

impl Default for LimitsFileConfig {
    fn default() -> Self {
        Self {
            max_payload_mb: default_max_payload_mb(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    4455
}
fn default_max_payload_mb() -> usize {
    8
}

/// Resolved relay configuration (runtime view).
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub max_payload_bytes: usize,
}

impl RelayConfig {
    pub fn from_file(fc: &FileConfig) -> anyhow::Result<Self> {
        let bind_addr = format!("{}:{}", fc.server.host, fc.server.port).parse()?;
        Ok(Self {
            bind_addr,
            max_payload_bytes: fc.limits.max_payload_mb * 1024 * 1024,
        })
    }
}

/// Build a figment that layers: defaults → relay.toml → DROP_RELAY_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `DROP_RELAY_SERVER__PORT=4455`        →  `server.port = 4455`
///   `DROP_RELAY_LIMITS__MAX_PAYLOAD_MB=4` →  `limits.max_payload_mb = 4`
pub fn load_config(config_path: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(config_path))
        .merge(Env::prefixed("DROP_RELAY_").split("__"))
}
