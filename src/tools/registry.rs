use std::collections::BTreeMap;
use std::sync::Arc;
use crate::config::CiphertraceConfig;
use crate::errors::CiphertraceError;
use crate::models::ToolKind;
use crate::pipeline::{PhaseSimulator, ToolHandle};
use crate::session::SessionStore;
use super::service::{ToolDescriptor, ToolService};
use super::{CallTracer, DocumentScanner, EmailChecker, FakeNewsTracker, PhishingDetector, Tool, VoiceIdentifier};
use tracing::info;

/// Every tool the workbench offers, keyed by kind.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn ToolService>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all six tools, each with its configured delay and history cap.
    pub fn from_config(config: &CiphertraceConfig, store: SessionStore) -> Self {
        let mut registry = Self::new();
        registry.register(handle(EmailChecker, config, &store));
        registry.register(handle(PhishingDetector, config, &store));
        registry.register(handle(CallTracer, config, &store));
        registry.register(handle(VoiceIdentifier, config, &store));
        registry.register(handle(DocumentScanner, config, &store));
        registry.register(handle(FakeNewsTracker, config, &store));
        info!(tools = registry.len(), "Tool registry ready");
        registry
    }

    pub fn register(&mut self, service: Arc<dyn ToolService>) {
        self.tools.insert(service.kind(), service);
    }

    pub fn get(&self, kind: ToolKind) -> Result<Arc<dyn ToolService>, CiphertraceError> {
        self.tools
            .get(&kind)
            .cloned()
            .ok_or_else(|| CiphertraceError::UnknownTool(kind.to_string()))
    }

    /// Look a tool up by its kebab-case name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolService>, CiphertraceError> {
        self.get(name.parse()?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolService>> {
        self.tools.values()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.iter().map(|t| t.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn handle<T: Tool>(tool: T, config: &CiphertraceConfig, store: &SessionStore) -> Arc<dyn ToolService> {
    let kind = tool.kind();
    let simulator = PhaseSimulator::new(config.phase_delay(kind));
    let mut handle = ToolHandle::new(tool, store.clone(), simulator, config.history_cap(kind));
    if let Some(seed) = config.simulation.seed {
        handle = handle.with_seed(seed);
    }
    Arc::new(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::input::ScanInput;

    fn instant_config() -> CiphertraceConfig {
        let mut config = CiphertraceConfig::default();
        config.simulation.min_delay_ms = 0;
        config.simulation.max_delay_ms = 0;
        config.simulation.seed = Some(5);
        config
    }

    #[test]
    fn test_all_tools_registered() {
        let registry = ToolRegistry::from_config(&instant_config(), SessionStore::new(Database::in_memory().unwrap()));
        assert_eq!(registry.len(), ToolKind::ALL.len());
        let descriptors = registry.descriptors();
        let voice = descriptors.iter().find(|d| d.kind == ToolKind::VoiceIdentifier).unwrap();
        assert_eq!(voice.input, "files");
        assert!(voice.accepted_extensions.contains(&"flac"));
        let email = descriptors.iter().find(|d| d.kind == ToolKind::EmailChecker).unwrap();
        assert_eq!(email.input, "text");
        assert_eq!(email.risk_levels, &["safe", "suspicious", "dangerous"]);
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = ToolRegistry::from_config(&instant_config(), SessionStore::new(Database::in_memory().unwrap()));
        assert_eq!(registry.resolve("call_tracer").unwrap().kind(), ToolKind::CallTracer);
        assert!(matches!(registry.resolve("lie-detector"), Err(CiphertraceError::UnknownTool(_))));
    }

    #[tokio::test]
    async fn test_tools_share_store_but_not_state() {
        let registry = ToolRegistry::from_config(&instant_config(), SessionStore::new(Database::in_memory().unwrap()));
        let tracer = registry.get(ToolKind::CallTracer).unwrap();
        let outcome = tracer.run(&ScanInput::text("2125550100"), None).await.unwrap();
        assert_eq!(outcome.overview.record_count, 1);
        assert_eq!(outcome.rows[0].id, "PH-001");
        assert_eq!(outcome.rows[0].subject, "2125550100");

        let phishing = registry.get(ToolKind::PhishingDetector).unwrap();
        assert!(phishing.current().unwrap().is_none());
        assert!(phishing.history().unwrap().is_empty());
        assert_eq!(tracer.history().unwrap().len(), 1);
        assert_eq!(tracer.session(&outcome.overview.id).unwrap()["id"], outcome.overview.id.as_str());
    }
}
