use std::path::Path;
use crate::errors::CiphertraceError;
use super::types::CiphertraceConfig;
use super::security::validate_security_patterns;
use super::schema::CONFIG_SCHEMA;
use tracing::{debug, warn};

const MAX_CONFIG_BYTES: u64 = 1_048_576;
const MAX_HISTORY_CAP: usize = 100;

pub async fn parse_config(path: &Path) -> Result<CiphertraceConfig, CiphertraceError> {
    if !path.exists() {
        return Err(CiphertraceError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(CiphertraceError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config = parse_config_str(&content)?;
    debug!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Load the config at `path`, or the defaults when no path is given.
pub async fn load_config(path: Option<&Path>) -> Result<CiphertraceConfig, CiphertraceError> {
    match path {
        Some(path) => parse_config(path).await,
        None => Ok(CiphertraceConfig::default()),
    }
}

pub fn parse_config_str(content: &str) -> Result<CiphertraceConfig, CiphertraceError> {
    // An empty file is a valid config with every default.
    if content.trim().is_empty() {
        return Ok(CiphertraceConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // Security pattern validation
    validate_security_patterns(&yaml)?;

    // JSON Schema validation
    validate_schema(&yaml)?;

    // Parse into typed config
    let config: CiphertraceConfig = serde_yaml::from_value(yaml)?;

    // Semantic checks the schema cannot express
    validate_semantics(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), CiphertraceError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| CiphertraceError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| CiphertraceError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory: typed parsing and semantic checks below are authoritative.
        for e in errors {
            warn!(validation_error = %e, path = %e.instance_path, "Config schema warning");
        }
    }

    Ok(())
}

fn validate_semantics(config: &CiphertraceConfig) -> Result<(), CiphertraceError> {
    let sim = &config.simulation;
    if sim.min_delay_ms > sim.max_delay_ms {
        return Err(CiphertraceError::Config(format!(
            "simulation.min_delay_ms ({}) is greater than max_delay_ms ({})",
            sim.min_delay_ms, sim.max_delay_ms
        )));
    }

    for (kind, overrides) in &config.tools {
        if let Some(cap) = overrides.history_cap {
            if !(1..=MAX_HISTORY_CAP).contains(&cap) {
                return Err(CiphertraceError::Config(format!(
                    "tools.{}.history_cap must be between 1 and {}, got {}",
                    kind, MAX_HISTORY_CAP, cap
                )));
            }
        }
        let min = overrides.min_delay_ms.unwrap_or(sim.min_delay_ms);
        let max = overrides.max_delay_ms.unwrap_or(sim.max_delay_ms);
        if min > max {
            return Err(CiphertraceError::Config(format!(
                "tools.{}: min delay ({}ms) is greater than max delay ({}ms)",
                kind, min, max
            )));
        }
    }

    for rule in &config.access.rules {
        if !rule.prefix.starts_with('/') {
            return Err(CiphertraceError::Config(format!(
                "access rule prefix '{}' must start with '/'",
                rule.prefix
            )));
        }
        if rule.public && !rule.roles.is_empty() {
            warn!(prefix = %rule.prefix, "Access rule is public; its role list is ignored");
        }
    }

    if config.server.port == 0 {
        return Err(CiphertraceError::Config("server.port must not be 0".into()));
    }

    if let Some(admin) = &config.auth.bootstrap_admin {
        if !admin.email.contains('@') {
            return Err(CiphertraceError::Config(format!(
                "auth.bootstrap_admin.email '{}' is not an email address",
                admin.email
            )));
        }
        if admin.password.is_empty() {
            warn!("Bootstrap admin configured with an empty password");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::ToolKind;

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
storage:
  db_path: /var/lib/ciphertrace/state.db
  export_dir: /var/lib/ciphertrace/exports
simulation:
  min_delay_ms: 100
  max_delay_ms: 200
  seed: 42
tools:
  document-scanner:
    history_cap: 5
access:
  rules:
    - prefix: /report-center
      roles: [admin]
server:
  host: 0.0.0.0
  port: 9000
auth:
  token_ttl_minutes: 15
  bootstrap_admin:
    email: root@agency.gov
    password: $CIPHERTRACE_ADMIN_PASSWORD
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.history_cap(ToolKind::DocumentScanner), 5);
        assert_eq!(config.server.port, 9000);
        let admin = config.auth.bootstrap_admin.unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.full_name, "Administrator");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config_str("  \n").unwrap();
        assert_eq!(config.storage.db_path, "./ciphertrace.db");
    }

    #[test]
    fn test_inverted_delays_rejected() {
        let err = parse_config_str("simulation:\n  min_delay_ms: 500\n  max_delay_ms: 100\n").unwrap_err();
        assert!(matches!(err, CiphertraceError::Config(_)));
    }

    #[test]
    fn test_cap_out_of_range_rejected() {
        let err = parse_config_str("tools:\n  call-tracer:\n    history_cap: 0\n").unwrap_err();
        assert!(err.to_string().contains("history_cap"));
    }

    #[test]
    fn test_unknown_tool_rejected() {
        assert!(parse_config_str("tools:\n  lie-detector:\n    history_cap: 3\n").is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(parse_config_str("access:\n  rules:\n    - prefix: /dashboard\n      roles: [overlord]\n").is_err());
    }

    #[test]
    fn test_relative_rule_prefix_rejected() {
        assert!(parse_config_str("access:\n  rules:\n    - prefix: dashboard\n").is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = parse_config(Path::new("/definitely/not/here.yaml")).await.unwrap_err();
        assert!(matches!(err, CiphertraceError::Config(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ciphertrace.yaml");
        tokio::fs::write(&path, "server:\n  port: 7070\n").await.unwrap();
        let config = load_config(Some(&path)).await.unwrap();
        assert_eq!(config.server.port, 7070);
        assert_eq!(load_config(None).await.unwrap().server.port, 8080);
    }
}
