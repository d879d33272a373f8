use serde::{Deserialize, Serialize};
use super::backend::{Profile, Role};
use tracing::debug;

/// One route-prefix rule. No roles listed means any signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRule {
    pub prefix: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl AccessRule {
    pub fn public(prefix: &str) -> Self {
        Self { prefix: prefix.to_string(), public: true, roles: Vec::new() }
    }

    pub fn authenticated(prefix: &str) -> Self {
        Self { prefix: prefix.to_string(), public: false, roles: Vec::new() }
    }

    pub fn roles(prefix: &str, roles: &[Role]) -> Self {
        Self { prefix: prefix.to_string(), public: false, roles: roles.to_vec() }
    }

    /// Segment-aware prefix match: `/api/tools` covers `/api/tools/x` but
    /// not `/api/toolsets`.
    fn covers(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Public,
    Allow,
    Unauthenticated,
    Forbidden,
}

/// Single declarative table deciding who may reach which route. The most
/// specific (longest) matching prefix wins; unmatched paths require a
/// signed-in user.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new(rules: Vec<AccessRule>) -> Self {
        Self { rules }
    }

    /// Add or replace rules. A rule with an existing prefix replaces it.
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = AccessRule>) -> Self {
        for rule in rules {
            match self.rules.iter_mut().find(|r| r.prefix == rule.prefix) {
                Some(existing) => *existing = rule,
                None => self.rules.push(rule),
            }
        }
        self
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    pub fn rule_for(&self, path: &str) -> Option<&AccessRule> {
        self.rules
            .iter()
            .filter(|r| r.covers(path))
            .max_by_key(|r| r.prefix.trim_end_matches('/').len())
    }

    pub fn evaluate(&self, path: &str, profile: Option<&Profile>) -> AccessDecision {
        let rule = self.rule_for(path);
        let decision = match (rule, profile) {
            (Some(rule), _) if rule.public => AccessDecision::Public,
            (_, None) => AccessDecision::Unauthenticated,
            (Some(rule), Some(profile)) if !rule.roles.is_empty() && !rule.roles.contains(&profile.role) => {
                AccessDecision::Forbidden
            }
            (_, Some(_)) => AccessDecision::Allow,
        };
        debug!(path, rule = rule.map(|r| r.prefix.as_str()), ?decision, "Access evaluated");
        decision
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(vec![
            AccessRule::public("/api/health"),
            AccessRule::public("/api/auth"),
            AccessRule::authenticated("/api/auth/session"),
            AccessRule::authenticated("/api/auth/sign-out"),
            AccessRule::authenticated("/dashboard"),
            AccessRule::roles("/case-history", &[Role::Admin, Role::Investigator]),
            AccessRule::roles("/report-center", &[Role::Admin, Role::Investigator, Role::Analyst]),
            AccessRule::authenticated("/api/tools"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> Profile {
        Profile {
            user_id: "u1".into(),
            email: "u@agency.gov".into(),
            role,
            full_name: "U".into(),
            department: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_routes() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.evaluate("/api/health", None), AccessDecision::Public);
        assert_eq!(policy.evaluate("/api/auth/sign-in", None), AccessDecision::Public);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.evaluate("/api/auth/session", None), AccessDecision::Unauthenticated);
        assert_eq!(policy.evaluate("/api/auth/session", Some(&user(Role::Viewer))), AccessDecision::Allow);
    }

    #[test]
    fn test_role_gated_pages() {
        let policy = AccessPolicy::default();
        let viewer = user(Role::Viewer);
        let analyst = user(Role::Analyst);
        let investigator = user(Role::Investigator);

        assert_eq!(policy.evaluate("/dashboard", Some(&viewer)), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/case-history", Some(&analyst)), AccessDecision::Forbidden);
        assert_eq!(policy.evaluate("/case-history", Some(&investigator)), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/report-center", Some(&analyst)), AccessDecision::Allow);
        assert_eq!(policy.evaluate("/report-center", Some(&viewer)), AccessDecision::Forbidden);
        assert_eq!(policy.evaluate("/report-center", None), AccessDecision::Unauthenticated);
    }

    #[test]
    fn test_prefix_respects_segments() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.evaluate("/dashboards", None), AccessDecision::Unauthenticated);
        assert_eq!(policy.rule_for("/api/toolsets").map(|r| r.prefix.as_str()), None);
        assert_eq!(policy.rule_for("/api/tools/call-tracer/scans").map(|r| r.prefix.as_str()), Some("/api/tools"));
    }

    #[test]
    fn test_override_replaces_rule() {
        let policy = AccessPolicy::default().with_rules([AccessRule::roles("/dashboard", &[Role::Admin])]);
        assert_eq!(policy.evaluate("/dashboard", Some(&user(Role::Viewer))), AccessDecision::Forbidden);
        assert_eq!(policy.rules().iter().filter(|r| r.prefix == "/dashboard").count(), 1);
    }
}
