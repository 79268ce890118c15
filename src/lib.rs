//! rsforest: turn flat, parent-referencing records into sorted trees.
//!
//! ```ignore
//! use rsforest::{build_forest, DomainResult, TreeNode};
//!
//! let rows = vec![(1, 0, "Engineering"), (2, 1, "Runtime")];
//! let roots = build_forest(rows, &|row: &(i64, i64, &str), node: &mut TreeNode| -> DomainResult<()> {
//!     node.set_id(row.0).set_parent_id(row.1).set_name(row.2);
//!     Ok(())
//! })?;
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    DomainError, DomainResult, ForestBuilder, NodeId, NodeSchema, NodeValue, RecordMapper,
    TreeNode, TreeNodeConvert,
};

/// Builds a forest from `records` with the default schema.
///
/// The mapper fills one fresh node per record; the returned roots are
/// sorted by weight, ties kept in input order.
pub fn build_forest<R, I, M>(records: I, mapper: &M) -> DomainResult<Vec<TreeNode>>
where
    I: IntoIterator<Item = R>,
    M: RecordMapper<R> + ?Sized,
{
    ForestBuilder::new().build_from(records, mapper)
}

/// Builds a forest from `records` with a custom schema.
pub fn build_forest_with_schema<R, I, M>(
    records: I,
    schema: NodeSchema,
    mapper: &M,
) -> DomainResult<Vec<TreeNode>>
where
    I: IntoIterator<Item = R>,
    M: RecordMapper<R> + ?Sized,
{
    ForestBuilder::with_schema(schema).build_from(records, mapper)
}
