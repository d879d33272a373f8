use tracing::debug;

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Mask an email address for logs: `d***@agency.gov`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("mypassword"), "mypassword");
    }

    #[test]
    fn test_resolve_credential_env_var() {
        std::env::set_var("TEST_CIPHERTRACE_CRED", "secret123");
        assert_eq!(resolve_credential("$TEST_CIPHERTRACE_CRED"), "secret123");
        std::env::remove_var("TEST_CIPHERTRACE_CRED");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        let result = resolve_credential("$NONEXISTENT_CIPHERTRACE_VAR");
        assert_eq!(result, "$NONEXISTENT_CIPHERTRACE_VAR");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("dana@agency.gov"), "d***@agency.gov");
        assert_eq!(mask_email("garbage"), "***");
    }
}
