//! Forest service
//!
//! Loads a record file and turns its records into sorted trees.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::records::{parse_records, TableMapper};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{path_to, ForestBuilder, NodeId, TreeNode};
use crate::infrastructure::traits::FileSystem;

/// Service for building forests out of record files.
pub struct ForestService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl ForestService {
    /// Create a new forest service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Builder configured by the current settings.
    pub fn builder(&self) -> ApplicationResult<ForestBuilder> {
        self.settings.builder()
    }

    /// Read the records of a file, in file order.
    #[instrument(level = "debug", skip(self))]
    pub fn read_records(&self, path: &Path) -> ApplicationResult<Vec<toml::Table>> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("record file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read records", path)?;
        parse_records(&content, &self.settings.records_table, path)
    }

    /// Roots of the forest described by a record file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_forest(&self, path: &Path) -> ApplicationResult<Vec<TreeNode>> {
        let records = self.read_records(path)?;
        let roots = self.builder()?.build_from(records, &TableMapper)?;
        debug!("load_forest: {} roots from {}", roots.len(), path.display());
        Ok(roots)
    }

    /// The forest of a record file under one synthetic root.
    #[instrument(level = "debug", skip(self))]
    pub fn load_single(&self, path: &Path) -> ApplicationResult<TreeNode> {
        let records = self.read_records(path)?;
        Ok(self.builder()?.build_single_from(records, &TableMapper)?)
    }

    /// Chain from a root down to the node carrying `id`.
    pub fn locate<'a>(
        &self,
        roots: &'a [TreeNode],
        id: &NodeId,
    ) -> ApplicationResult<Vec<&'a TreeNode>> {
        path_to(roots, id).ok_or_else(|| ApplicationError::NodeNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{count_nodes, SINGLE_ROOT_NAME};
    use crate::infrastructure::traits::MemoryFileSystem;

    const ORG: &str = r#"
[[records]]
id = 1
parentId = 0
name = "Engineering"
weight = 2

[[records]]
id = 2
parentId = 0
name = "Sales"
weight = 1

[[records]]
id = 3
parentId = 1
name = "Runtime"
"#;

    fn service(content: &str, settings: Settings) -> ForestService {
        let fs = MemoryFileSystem::new().with_file("/data/org.toml", content);
        ForestService::new(Arc::new(fs), Arc::new(settings))
    }

    fn names(nodes: &[TreeNode]) -> Vec<&str> {
        nodes
            .iter()
            .map(|n| n.name().unwrap().unwrap_or_default())
            .collect()
    }

    #[test]
    fn given_record_file_when_loading_then_roots_sorted_by_weight() {
        let roots = service(ORG, Settings::default())
            .load_forest(Path::new("/data/org.toml"))
            .unwrap();

        assert_eq!(names(&roots), vec!["Sales", "Engineering"]);
        assert_eq!(names(roots[1].children().unwrap()), vec!["Runtime"]);
    }

    #[test]
    fn given_record_file_when_loading_single_then_synthetic_root_holds_roots() {
        let root = service(ORG, Settings::default())
            .load_single(Path::new("/data/org.toml"))
            .unwrap();

        assert_eq!(root.name().unwrap(), Some(SINGLE_ROOT_NAME));
        assert_eq!(names(root.children().unwrap()), vec!["Sales", "Engineering"]);
    }

    #[test]
    fn given_custom_schema_settings_when_loading_then_columns_are_remapped() {
        let content = r#"
[[depts]]
deptId = "eng"
parentDeptId = "top"
title = "Engineering"

[[depts]]
deptId = "rt"
parentDeptId = "eng"
title = "Runtime"
"#;
        let mut settings = Settings {
            root_parent_id: NodeId::from("top"),
            records_table: "depts".into(),
            ..Settings::default()
        };
        settings.schema.id_key = "deptId".into();
        settings.schema.parent_id_key = "parentDeptId".into();
        settings.schema.name_key = "title".into();
        settings.schema.children_key = "subDepts".into();

        let roots = service(content, settings)
            .load_forest(Path::new("/data/org.toml"))
            .unwrap();

        assert_eq!(names(&roots), vec!["Engineering"]);
        assert!(roots[0].get("subDepts").is_some());
        assert_eq!(names(roots[0].children().unwrap()), vec!["Runtime"]);
    }

    #[test]
    fn given_max_depth_setting_when_loading_then_prunes_below() {
        let settings = Settings {
            max_depth: Some(0),
            ..Settings::default()
        };
        let roots = service(ORG, settings)
            .load_forest(Path::new("/data/org.toml"))
            .unwrap();
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|r| r.children().unwrap().is_empty()));
    }

    #[test]
    fn given_missing_file_when_loading_then_operation_failed() {
        let err = service(ORG, Settings::default())
            .load_forest(Path::new("/data/other.toml"))
            .unwrap_err();
        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
        assert!(err.to_string().contains("record file not found"));
    }

    #[test]
    fn given_cyclic_records_when_loading_then_loop_is_cut_into_a_root() {
        let content = r#"
[[records]]
id = 1
parentId = 2

[[records]]
id = 2
parentId = 1
"#;
        let roots = service(content, Settings::default())
            .load_forest(Path::new("/data/org.toml"))
            .unwrap();

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id().unwrap(), NodeId::Int(1));
        assert_eq!(count_nodes(&roots), 2);
    }

    #[test]
    fn given_unknown_id_when_locating_then_node_not_found() {
        let svc = service(ORG, Settings::default());
        let roots = svc.load_forest(Path::new("/data/org.toml")).unwrap();

        let path = svc.locate(&roots, &NodeId::Int(3)).unwrap();
        assert_eq!(path.len(), 2);

        let err = svc.locate(&roots, &NodeId::Int(99)).unwrap_err();
        assert_eq!(err.to_string(), "node not found: 99");
    }
}
