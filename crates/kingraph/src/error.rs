/// Failures of the layout stores. Cloneable so a shared in-flight save can hand the same
/// outcome to every waiter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Remote layout store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed layout payload: {0}")]
    Malformed(String),

    #[error("Layout cache I/O failed for `{key}`: {message}")]
    Io { key: String, message: String },
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("The view has no settled layout yet")]
    NotReady,

    #[error("The view has no nodes to save")]
    NothingToSave,

    #[error(transparent)]
    Store(#[from] StoreError),
}
