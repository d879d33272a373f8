use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::auth::{AccessPolicy, AccessRule, Role};
use crate::models::ToolKind;
use crate::pipeline::PhaseDelay;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CiphertraceConfig {
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
    pub tools: BTreeMap<ToolKind, ToolOverrides>,
    pub access: AccessConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub export_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: "./ciphertrace.db".to_string(),
            export_dir: "./exports".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fixed RNG seed for reproducible results.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 800,
            max_delay_ms: 1500,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ToolOverrides {
    pub history_cap: Option<usize>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AccessConfig {
    /// Extra or replacement rules layered over the built-in policy.
    pub rules: Vec<AccessRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_ttl_minutes: i64,
    pub bootstrap_admin: Option<BootstrapAccount>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: 60,
            bootstrap_admin: None,
        }
    }
}

/// Account created at startup. `password` may be a `$ENV_VAR` reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapAccount {
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub full_name: String,
    #[serde(default = "default_admin_role")]
    pub role: Role,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_admin_role() -> Role {
    Role::Admin
}

impl CiphertraceConfig {
    pub fn history_cap(&self, kind: ToolKind) -> usize {
        self.tools
            .get(&kind)
            .and_then(|t| t.history_cap)
            .unwrap_or_else(|| kind.default_history_cap())
    }

    pub fn phase_delay(&self, kind: ToolKind) -> PhaseDelay {
        let overrides = self.tools.get(&kind);
        let min = overrides.and_then(|t| t.min_delay_ms).unwrap_or(self.simulation.min_delay_ms);
        let max = overrides.and_then(|t| t.max_delay_ms).unwrap_or(self.simulation.max_delay_ms);
        PhaseDelay::from_millis(min, max)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::default().with_rules(self.access.rules.iter().cloned())
    }
}
