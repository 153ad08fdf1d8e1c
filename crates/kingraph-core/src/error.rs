pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input JSON: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("Invalid view option `{field}`: {message}")]
    InvalidOption { field: &'static str, message: String },
}
