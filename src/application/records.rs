//! TOML record files
//!
//! A record file holds an array of tables, one table per record:
//!
//! ```toml
//! [[records]]
//! id = 1
//! parentId = 0
//! name = "Engineering"
//! weight = 2
//! ```
//!
//! Column names are matched against the node schema, so a file written
//! for a custom schema (`deptId`, `parentDeptId`, ...) maps without code.

use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainResult, NodeValue, RecordMapper, TreeNode};

/// Copies every column of a TOML record onto the node, in file order.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableMapper;

impl RecordMapper<toml::Table> for TableMapper {
    fn parse(&self, record: &toml::Table, node: &mut TreeNode) -> DomainResult<()> {
        for (key, value) in record {
            node.set(key.clone(), NodeValue::from(value.clone()));
        }
        Ok(())
    }
}

/// Extracts the records stored under `table` from TOML `content`.
///
/// `path` is used for error messages only.
#[instrument(level = "debug", skip(content))]
pub fn parse_records(content: &str, table: &str, path: &Path) -> ApplicationResult<Vec<toml::Table>> {
    let invalid = |message: String| ApplicationError::InvalidRecords {
        path: path.to_path_buf(),
        message,
    };

    let mut document: toml::Table = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let entries = match document.remove(table) {
        Some(toml::Value::Array(entries)) => entries,
        Some(other) => {
            return Err(invalid(format!(
                "'{}' must be an array of tables, found {}",
                table,
                other.type_str()
            )))
        }
        None => return Err(invalid(format!("no '{}' array found", table))),
    };

    let records = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry {
            toml::Value::Table(record) => Ok(record),
            other => Err(invalid(format!(
                "record #{} must be a table, found {}",
                i,
                other.type_str()
            ))),
        })
        .collect::<ApplicationResult<Vec<_>>>()?;
    debug!("parsed {} records", records.len());
    Ok(records)
}
