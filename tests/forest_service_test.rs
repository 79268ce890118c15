//! Integration tests for loading record files from disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use rsforest::application::ApplicationError;
use rsforest::config::{local_config_path, Settings};
use rsforest::domain::{leaf_paths, DomainError, NodeId, TreeNodeConvert};
use rsforest::infrastructure::di::ServiceContainer;

const ORG: &str = r#"
[[records]]
id = 1
parentId = 0
name = "Engineering"
weight = 2

[[records]]
id = 2
parentId = 1
name = "Runtime"

[[records]]
id = 3
parentId = 0
name = "Sales"
weight = 1

[[records]]
id = 4
parentId = 2
name = "Scheduler"
"#;

fn write_records(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("org.toml");
    fs::write(&path, content).expect("write record file");
    path
}

#[test]
fn given_record_file_when_rendering_then_sorted_tree() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = write_records(&dir, ORG);
    let services = ServiceContainer::new(Settings::default());

    // Act
    let roots = services.forest_service.load_forest(&path).unwrap();

    // Assert
    let expected = "\
.
├── Sales [3]
└── Engineering [1]
    └── Runtime [2]
        └── Scheduler [4]
";
    assert_eq!(roots.to_tree_string().to_string(), expected);
}

#[test]
fn given_record_file_when_collecting_leaf_paths_then_root_to_leaf() {
    let dir = TempDir::new().unwrap();
    let path = write_records(&dir, ORG);
    let services = ServiceContainer::new(Settings::default());

    let roots = services.forest_service.load_forest(&path).unwrap();
    let paths: Vec<Vec<String>> = leaf_paths(&roots)
        .into_iter()
        .map(|p| p.iter().map(|n| n.to_string()).collect())
        .collect();

    assert_eq!(
        paths,
        vec![
            vec!["Sales [3]".to_string()],
            vec![
                "Engineering [1]".to_string(),
                "Runtime [2]".to_string(),
                "Scheduler [4]".to_string()
            ],
        ]
    );
}

#[test]
fn given_local_config_next_to_records_when_loading_then_schema_applies() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "records_table = \"depts\"\n[schema]\nid_key = \"code\"\nparent_id_key = \"parent\"\n",
    )
    .unwrap();
    let path = write_records(
        &dir,
        r#"
[[depts]]
code = "eng"
parent = 0

[[depts]]
code = "rt"
parent = "eng"
"#,
    );
    let settings = Settings::load_from(None, Some(dir.path())).unwrap();
    let services = ServiceContainer::new(settings);

    // Act
    let roots = services.forest_service.load_forest(&path).unwrap();

    // Assert
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].id().unwrap(), NodeId::from("eng"));
    assert_eq!(roots[0].children().unwrap().len(), 1);
}

#[test]
fn given_records_without_array_when_loading_then_invalid_records() {
    let dir = TempDir::new().unwrap();
    let path = write_records(&dir, "title = \"no records here\"\n");
    let services = ServiceContainer::new(Settings::default());

    let err = services.forest_service.load_forest(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidRecords { .. }));
}

#[test]
fn given_record_without_id_when_loading_then_missing_attribute() {
    let dir = TempDir::new().unwrap();
    let path = write_records(&dir, "[[records]]\nname = \"anonymous\"\n");
    let services = ServiceContainer::new(Settings::default());

    let err = services.forest_service.load_forest(&path).unwrap_err();

    assert!(
        matches!(
            err,
            ApplicationError::Domain(DomainError::MissingAttribute { ref key }) if key == "id"
        ),
        "unexpected error: {err}"
    );
}
