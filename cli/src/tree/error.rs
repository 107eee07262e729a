use crate::schema::SchemaError;

use super::node::NodeKey;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("Node {key} does not exist in this tree")]
    NodeNotFound { key: NodeKey },

    #[error("No node with id '{id}'")]
    UnknownId { id: String },

    #[error("Node '{id}' is not a container")]
    NotAContainer { id: String },

    #[error("The root node cannot be moved or deleted")]
    RootImmovable,

    #[error("A tree has exactly one root node")]
    DuplicateRoot,

    #[error("Node '{child}' is not a child of '{parent}'")]
    NotAChild { parent: String, child: String },

    #[error("Moving '{node}' under '{parent}' would create a cycle")]
    WouldCreateCycle { node: String, parent: String },

    #[error("Position {index} is out of range for '{parent}' ({len} children)")]
    PositionOutOfRange {
        parent: String,
        index: usize,
        len: usize,
    },

    #[error("Link target of '{id}' cannot be resolved")]
    UnresolvedLink { id: String },

    #[error("Schema error: {source}")]
    Schema {
        #[from]
        source: SchemaError,
    },
}
