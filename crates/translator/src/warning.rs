//! Translation warnings (spec §4.1 "Warnings").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    DataLoss,
    Compatibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationWarning {
    pub kind: WarningKind,
    pub severity: Severity,
    pub object: String,
    pub message: String,
}

impl TranslationWarning {
    pub fn data_loss(object: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::DataLoss,
            severity,
            object: object.into(),
            message: message.into(),
        }
    }

    pub fn compatibility(
        object: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: WarningKind::Compatibility,
            severity,
            object: object.into(),
            message: message.into(),
        }
    }
}
