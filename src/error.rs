use thiserror::Error;

use crate::tree::TreeNodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid model document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("invalid node heights: {0}")]
    InvalidHeights(#[source] serde_json::Error),

    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid layout config: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    #[error("unknown tree node: {0}")]
    UnknownTreeNode(TreeNodeId),

    #[error("the root of an activity tree cannot be removed")]
    RemoveTreeRoot,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
