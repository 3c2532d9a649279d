use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("key has no primary component")]
    InvalidKey,
    #[error("tree holds no entries")]
    Empty,
    #[error("stale or foreign node handle {0:?}")]
    StaleHandle(NodeId),
    #[error("node {0:?} is a branch, expected a leaf")]
    NotALeaf(NodeId),
    #[error("sentinel leaf {0:?} cannot be removed")]
    SentinelLeaf(NodeId),
    #[error("leaf {0:?} is already linked into the tree")]
    AlreadyLinked(NodeId),
    #[error("leaf {0:?} is not linked into the tree")]
    NotLinked(NodeId),
}
