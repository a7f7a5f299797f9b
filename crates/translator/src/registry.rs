//! Strategy registry and contract (spec §4.1, §9 "capability-set
//! interface"): strategies are keyed by `(SourceParadigm, TargetParadigm)`
//! and registered once at process start, then resolved read-mostly for the
//! lifetime of the process — the same shared-state shape spec §5 calls out
//! for the strategy registry.

use crate::context::{ConversionOutput, PendingDecision, TranslationContext};
use crate::error::{Result, TranslatorError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use unified_model::{DatabaseType, UnifiedModelEnrichment};

/// The capability-set every translation strategy implements (spec §4.1).
pub trait Strategy: Send + Sync {
    /// Unique across the whole registry.
    fn name(&self) -> &'static str;

    fn source_paradigm(&self) -> DatabaseType;
    fn target_paradigm(&self) -> DatabaseType;

    fn requires_sample_data(&self) -> bool;
    fn requires_enrichment(&self) -> bool;

    /// Object types (e.g. `"table"`, `"node"`) this strategy consumes from
    /// the source model.
    fn supported_source_types(&self) -> &'static [&'static str];

    fn get_user_decisions(&self, ctx: &TranslationContext) -> Vec<PendingDecision>;

    fn convert(
        &self,
        ctx: &mut TranslationContext,
        enrichment: Option<&UnifiedModelEnrichment>,
    ) -> Result<ConversionOutput>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ParadigmPair(DatabaseType, DatabaseType);

/// Registry of translation strategies, guarded the way spec §4.1 specifies:
/// a write lock for insertion, a read lock for resolution.
#[derive(Default)]
pub struct StrategyRegistry {
    by_pair: RwLock<HashMap<ParadigmPair, Arc<dyn Strategy>>>,
    names: RwLock<std::collections::HashSet<&'static str>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `strategy`, rejecting a second strategy with the same
    /// name or the same source/target paradigm pair.
    pub fn register(&self, strategy: Arc<dyn Strategy>) -> Result<()> {
        let name = strategy.name();
        {
            let mut names = self.names.write();
            if !names.insert(name) {
                tracing::warn!(strategy = name, "duplicate strategy registration rejected");
                return Err(TranslatorError::DuplicateStrategyName(name.to_string()));
            }
        }

        let pair = ParadigmPair(strategy.source_paradigm(), strategy.target_paradigm());
        tracing::debug!(
            strategy = name,
            source = ?pair.0,
            target = ?pair.1,
            "registered translation strategy"
        );
        self.by_pair.write().insert(pair, strategy);
        Ok(())
    }

    /// Resolves the strategy for `(source, target)`, or
    /// `ErrUnsupportedParadigm` if no strategy is registered for that pair.
    pub fn resolve(
        &self,
        source: DatabaseType,
        target: DatabaseType,
    ) -> Result<Arc<dyn Strategy>> {
        self.by_pair
            .read()
            .get(&ParadigmPair(source, target))
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(?source, ?target, "no strategy registered for paradigm pair");
                TranslatorError::ErrUnsupportedParadigm { source, target }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::NullStrategy;

    #[test]
    fn unresolvable_pair_fails_with_unsupported_paradigm() {
        let registry = StrategyRegistry::new();
        let err = registry
            .resolve(DatabaseType::Vector, DatabaseType::Search)
            .unwrap_err();
        assert!(matches!(err, TranslatorError::ErrUnsupportedParadigm { .. }));
    }

    #[test]
    fn duplicate_strategy_name_is_rejected() {
        let registry = StrategyRegistry::new();
        registry
            .register(Arc::new(NullStrategy::new(
                "dup",
                DatabaseType::KeyValue,
                DatabaseType::Document,
            )))
            .unwrap();
        let err = registry
            .register(Arc::new(NullStrategy::new(
                "dup",
                DatabaseType::Document,
                DatabaseType::KeyValue,
            )))
            .unwrap_err();
        assert!(matches!(err, TranslatorError::DuplicateStrategyName(_)));
    }

    #[test]
    fn registered_strategy_resolves_by_paradigm_pair() {
        let registry = StrategyRegistry::new();
        registry
            .register(Arc::new(NullStrategy::new(
                "kv_to_doc",
                DatabaseType::KeyValue,
                DatabaseType::Document,
            )))
            .unwrap();

        let resolved = registry
            .resolve(DatabaseType::KeyValue, DatabaseType::Document)
            .unwrap();
        assert_eq!(resolved.name(), "kv_to_doc");
    }
}
