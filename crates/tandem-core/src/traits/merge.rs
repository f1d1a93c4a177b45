use crate::errors::TandemResult;

/// Attribute-level merge delegate used by the `merge_changes` resolution.
///
/// Implementations return `CollabError::MergeFailed` when the two values
/// cannot be reconciled; the engine then leaves the conflict open.
pub trait FieldMergeFunction: Send + Sync {
    fn merge(
        &self,
        field_key: &str,
        a: &serde_json::Value,
        b: &serde_json::Value,
    ) -> TandemResult<serde_json::Value>;
}
