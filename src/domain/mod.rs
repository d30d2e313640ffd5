//! Domain layer: hierarchy entities and the persistent forest
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod forest;
pub mod form;
pub mod id;
pub mod node;

pub use error::{DomainError, DomainResult, FieldError};
pub use forest::{Forest, ForestIter};
pub use form::{FormMode, HIERARCHY_ATTRIBUTES};
pub use id::{generator_for, IdGenerator, IdStrategy, SequenceGenerator, UuidGenerator};
pub use node::{HierarchyNode, NodeKind, NodeType, NodeUpdate};
