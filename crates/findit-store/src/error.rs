use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username `{0}` is already taken")]
    AlreadyExists(String),

    #[error("unknown user `{0}`")]
    UnknownUser(String),

    #[error("item {0} not found")]
    ItemNotFound(i64),

    #[error("no item id left after {0}")]
    IdsExhausted(i64),

    #[error("no report from `{reporter}` on item {item_id}")]
    ReportNotFound { item_id: i64, reporter: String },

    #[error("item {item_id} is not owned by `{caller}`")]
    Forbidden { item_id: i64, caller: String },

    #[error("`{reporter}` has already reported item {item_id}")]
    AlreadyReported { item_id: i64, reporter: String },

    #[error("report from `{reporter}` on item {item_id} is already resolved")]
    AlreadyResolved { item_id: i64, reporter: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("record store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// True for failures of the backing files rather than of the request.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Json { .. } | Self::LockPoisoned)
    }
}
