/// All errors that can be returned by an `ObjectStore` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uuid prefix matched more than one record of the same kind, so the
    /// lookup cannot pick a single record.
    #[error("ambiguous {kind} uuid prefix: [{prefix}]")]
    AmbiguousUuid { kind: &'static str, prefix: String },

    /// A backend-specific failure (connection, serialization, etc.).
    #[error("store backend error: {0}")]
    Backend(String),
}
