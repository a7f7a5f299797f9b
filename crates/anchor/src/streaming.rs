//! Pagination cursor shared by `StreamTableData`/`GetTableRowCount` (spec
//! §4.2.2): offset-based or opaque cursor-based, never both at once, and
//! never a partial batch paired with `is_complete=false`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamCursor {
    /// Monotonic integer offset.
    Offset(u64),
    /// Opaque, adapter-defined token the caller passes back verbatim.
    Token(String),
}

/// One page of rows streamed back from `StreamTableData`.
#[derive(Debug, Clone)]
pub struct StreamBatch {
    pub rows: Vec<serde_json::Value>,
    pub is_complete: bool,
    pub next_cursor: Option<StreamCursor>,
}

impl StreamBatch {
    /// Builds a batch from a fetched page, deriving `is_complete` from the
    /// spec's rule: fewer rows than `batch_size` means the source is
    /// exhausted.
    pub fn from_page(
        rows: Vec<serde_json::Value>,
        batch_size: usize,
        next_cursor: Option<StreamCursor>,
    ) -> Self {
        let is_complete = rows.len() < batch_size;
        Self {
            rows,
            is_complete,
            next_cursor: if is_complete { None } else { next_cursor },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_page_is_marked_complete_and_drops_cursor() {
        let batch = StreamBatch::from_page(
            vec![serde_json::json!({"a": 1})],
            10,
            Some(StreamCursor::Offset(1)),
        );
        assert!(batch.is_complete);
        assert!(batch.next_cursor.is_none());
    }

    #[test]
    fn full_page_is_incomplete_and_carries_cursor() {
        let rows = vec![serde_json::json!({"a": 1}); 10];
        let batch = StreamBatch::from_page(rows, 10, Some(StreamCursor::Offset(10)));
        assert!(!batch.is_complete);
        assert_eq!(batch.next_cursor, Some(StreamCursor::Offset(10)));
    }
}
