//! A strategy test double used only by the registry's own unit tests
//! (spec §4.1 "expansion" note): it lets registration/resolution/override
//! behavior be exercised without a third real paradigm conversion.

use crate::context::{ConversionOutput, PendingDecision, TranslationContext};
use crate::registry::Strategy;
use unified_model::{DatabaseType, UnifiedModel, UnifiedModelEnrichment};

pub struct NullStrategy {
    name: &'static str,
    source: DatabaseType,
    target: DatabaseType,
}

impl NullStrategy {
    pub fn new(name: &'static str, source: DatabaseType, target: DatabaseType) -> Self {
        Self {
            name,
            source,
            target,
        }
    }
}

impl Strategy for NullStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn source_paradigm(&self) -> DatabaseType {
        self.source
    }

    fn target_paradigm(&self) -> DatabaseType {
        self.target
    }

    fn requires_sample_data(&self) -> bool {
        false
    }

    fn requires_enrichment(&self) -> bool {
        false
    }

    fn supported_source_types(&self) -> &'static [&'static str] {
        &[]
    }

    fn get_user_decisions(&self, _ctx: &TranslationContext) -> Vec<PendingDecision> {
        Vec::new()
    }

    fn convert(
        &self,
        _ctx: &mut TranslationContext,
        _enrichment: Option<&UnifiedModelEnrichment>,
    ) -> crate::error::Result<ConversionOutput> {
        Ok(ConversionOutput {
            target_schema: UnifiedModel::new(self.target),
            mappings: Vec::new(),
            warnings: Vec::new(),
        })
    }
}
