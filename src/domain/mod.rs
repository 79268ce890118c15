//! Domain layer: the forest-construction engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod error;
pub mod node;
pub mod ordering;
pub mod registry;
pub mod render;
pub mod schema;
pub mod traverse;
pub mod value;

pub use arena::{ArenaNode, NodeArena};
pub use builder::{ForestBuilder, RecordMapper, SINGLE_ROOT_NAME};
pub use error::{DomainError, DomainResult};
pub use node::TreeNode;
pub use ordering::{sort_by_weight, stable_sort_by};
pub use registry::NodeRegistry;
pub use render::TreeNodeConvert;
pub use schema::NodeSchema;
pub use traverse::{count_nodes, find_in, leaf_paths, path_to};
pub use value::{compare_weights, NodeId, NodeValue};
