//! Integration tests for forest construction through the public entry points.

use rstest::{fixture, rstest};

use rsforest::domain::{count_nodes, NodeRegistry};
use rsforest::util::testing;
use rsforest::{
    build_forest, build_forest_with_schema, DomainError, DomainResult, ForestBuilder, NodeId,
    NodeSchema, NodeValue, TreeNode,
};

/// Flat record as it would come out of a table: id, parent id, optional weight.
#[derive(Debug, Clone)]
struct Row {
    id: i64,
    parent: i64,
    weight: Option<i64>,
    name: &'static str,
}

fn row(id: i64, parent: i64, weight: Option<i64>, name: &'static str) -> Row {
    Row {
        id,
        parent,
        weight,
        name,
    }
}

fn map_row(row: &Row, node: &mut TreeNode) -> DomainResult<()> {
    node.set_id(row.id).set_parent_id(row.parent).set_name(row.name);
    if let Some(weight) = row.weight {
        node.set_weight(weight);
    }
    Ok(())
}

fn ids(nodes: &[TreeNode]) -> Vec<NodeId> {
    nodes.iter().map(|n| n.id().unwrap()).collect()
}

#[fixture]
fn org_rows() -> Vec<Row> {
    testing::init_test_setup();
    vec![
        row(1, 0, Some(3), "Engineering"),
        row(2, 1, None, "Runtime"),
        row(3, 0, Some(1), "Sales"),
        row(4, 2, None, "Scheduler"),
        row(5, 0, Some(2), "Finance"),
        row(6, 1, None, "Tooling"),
        row(7, 3, None, "Field"),
    ]
}

// ============================================================
// Numbered properties
// ============================================================

#[rstest]
fn given_same_records_when_building_twice_then_same_root_order(org_rows: Vec<Row>) {
    // Act
    let first = build_forest(org_rows.clone(), &map_row).unwrap();
    let second = build_forest(org_rows, &map_row).unwrap();

    // Assert
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(first, second);
}

#[rstest]
#[case(vec![])]
#[case(vec![row(1, 0, None, "a")])]
#[case(vec![row(1, 0, None, "a"), row(2, 1, None, "b"), row(3, 2, None, "c")])]
#[case(vec![row(1, 99, None, "orphan"), row(2, 1, None, "child"), row(3, 0, Some(1), "root")])]
fn given_n_records_when_building_then_exactly_n_nodes_reachable(#[case] rows: Vec<Row>) {
    let n = rows.len();
    let roots = build_forest(rows, &map_row).unwrap();
    assert_eq!(count_nodes(&roots), n);
}

#[rstest]
fn given_org_when_building_then_every_node_reachable(org_rows: Vec<Row>) {
    let n = org_rows.len();
    let roots = build_forest(org_rows, &map_row).unwrap();
    assert_eq!(count_nodes(&roots), n);
}

#[rstest]
fn given_sentinel_and_linked_parents_when_building_then_roots_are_exactly_sentinel_children(
    org_rows: Vec<Row>,
) {
    // Arrange
    let expected_roots: Vec<NodeId> = org_rows
        .iter()
        .filter(|r| r.parent == 0)
        .map(|r| NodeId::Int(r.id))
        .collect();

    // Act
    let roots = build_forest(org_rows, &map_row).unwrap();

    // Assert
    let root_ids = ids(&roots);
    for id in &expected_roots {
        assert!(root_ids.contains(id), "{id} should be a root");
    }
    assert_eq!(root_ids.len(), expected_roots.len());
}

#[test]
fn given_unknown_parent_when_building_then_orphan_becomes_root() {
    let roots = build_forest(vec![row(1, 99, None, "lost")], &map_row).unwrap();

    assert_eq!(ids(&roots), vec![NodeId::Int(1)]);
    assert!(roots[0].children().unwrap().is_empty());
}

#[test]
fn given_nesting_example_when_building_then_sorted_roots_with_child() {
    // Arrange
    let rows = vec![
        row(1, 0, Some(2), "heavy"),
        row(2, 1, None, "child"),
        row(3, 0, Some(1), "light"),
    ];

    // Act
    let roots = build_forest(rows, &map_row).unwrap();

    // Assert
    assert_eq!(ids(&roots), vec![NodeId::Int(3), NodeId::Int(1)]);
    assert_eq!(ids(roots[1].children().unwrap()), vec![NodeId::Int(2)]);
    assert!(roots[0].children().unwrap().is_empty());
}

#[test]
fn given_unweighted_roots_when_building_then_input_order_kept() {
    let rows = vec![row(1, 0, None, "first"), row(2, 0, None, "second")];
    let roots = build_forest(rows, &map_row).unwrap();
    assert_eq!(ids(&roots), vec![NodeId::Int(1), NodeId::Int(2)]);
}

#[test]
fn given_duplicate_ids_when_indexing_then_last_wins_and_both_are_roots() {
    // Arrange
    let rows = vec![row(1, 0, None, "a"), row(1, 0, None, "b")];
    let builder = ForestBuilder::new();
    let nodes: Vec<TreeNode> = rows
        .iter()
        .map(|r| {
            let mut node = builder.new_node();
            map_row(r, &mut node).unwrap();
            node
        })
        .collect();

    // Act
    let mut registry = NodeRegistry::new(Some(NodeId::Int(0)));
    registry.index(nodes.clone()).unwrap();
    let roots = builder.build(nodes).unwrap();

    // Assert
    let resolved = registry.lookup(&NodeId::Int(1)).unwrap();
    assert_eq!(resolved.name().unwrap(), Some("b"));
    let names: Vec<_> = roots.iter().map(|n| n.name().unwrap()).collect();
    assert_eq!(names, vec![Some("a"), Some("b")]);
}

#[test]
fn given_no_records_when_building_then_empty_forest() {
    let roots = build_forest(Vec::<Row>::new(), &map_row).unwrap();
    assert!(roots.is_empty());
}

// ============================================================
// Schema, sentinel and error propagation
// ============================================================

#[test]
fn given_custom_schema_when_building_then_children_under_custom_key() {
    // Arrange
    let schema = NodeSchema::new("deptId", "parentDeptId", "title", "rank", "subDepts").unwrap();
    let rows = vec![("eng", "top", 2), ("ops", "top", 1), ("rt", "eng", 0)];

    // Act
    let roots = build_forest_with_schema(
        rows,
        schema,
        &|r: &(&str, &str, i64), node: &mut TreeNode| -> DomainResult<()> {
            node.set_id(r.0).set_parent_id(r.1).set_weight(r.2);
            Ok(())
        },
    );

    // Assert: "top" is not the sentinel, so both departments are orphans
    let roots = roots.unwrap();
    assert_eq!(ids(&roots), vec![NodeId::from("ops"), NodeId::from("eng")]);
    assert!(matches!(roots[1].get("subDepts"), Some(NodeValue::Nodes(c)) if c.len() == 1));
    assert!(roots[1].get("children").is_none());
    assert_eq!(roots[1].get("deptId"), Some(&NodeValue::from("eng")));
}

#[test]
fn given_zero_as_real_id_when_sentinel_disabled_then_zero_is_a_parent() {
    let rows = vec![row(0, -1, None, "zero"), row(1, 0, None, "one")];
    let builder = ForestBuilder::new().root_parent_id(None);
    let roots = builder.build_from(rows, &map_row).unwrap();

    assert_eq!(ids(&roots), vec![NodeId::Int(0)]);
    assert_eq!(ids(roots[0].children().unwrap()), vec![NodeId::Int(1)]);
}

#[rstest]
#[case(vec![row(1, 0, None, "root"), row(2, 2, None, "self")])]
#[case(vec![row(1, 0, None, "root"), row(2, 3, None, "left"), row(3, 2, None, "right")])]
#[case(vec![row(1, 0, None, "root"), row(2, 3, None, "a"), row(3, 2, None, "b"), row(4, 1, None, "c")])]
#[case(vec![row(1, 2, None, "a"), row(2, 3, None, "b"), row(3, 1, None, "c"), row(4, 3, None, "d")])]
fn given_parent_loop_when_building_then_forest_keeps_every_record(#[case] rows: Vec<Row>) {
    // Arrange
    let n = rows.len();

    // Act
    let roots = build_forest(rows, &map_row).unwrap();

    // Assert
    assert_eq!(count_nodes(&roots), n);
}

#[test]
fn given_parent_loop_when_building_then_first_looped_record_becomes_root() {
    let rows = vec![
        row(1, 0, Some(1), "root"),
        row(2, 3, Some(2), "left"),
        row(3, 2, None, "right"),
    ];

    let roots = build_forest(rows, &map_row).unwrap();

    assert_eq!(ids(&roots), vec![NodeId::Int(1), NodeId::Int(2)]);
    assert_eq!(ids(roots[1].children().unwrap()), vec![NodeId::Int(3)]);
}

#[test]
fn given_list_weight_when_sorting_roots_then_cast_error_propagates() {
    let rows = vec![1, 2];
    let err = build_forest(rows, &|id: &i64, node: &mut TreeNode| -> DomainResult<()> {
        node.set_id(*id)
            .set_parent_id(0)
            .set_weight(NodeValue::List(vec![NodeValue::Int(1)]));
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, DomainError::Cast { .. }));
}

#[test]
fn given_mapper_failing_on_third_record_when_building_then_error_carries_its_index() {
    let rows = vec![
        row(1, 0, None, "ok"),
        row(2, 1, None, "ok"),
        row(3, 1, None, ""),
    ];
    let err = build_forest(rows, &|r: &Row, node: &mut TreeNode| -> DomainResult<()> {
        if r.name.is_empty() {
            return Err(DomainError::InvalidRecord(format!("record {} has no name", r.id)));
        }
        map_row(r, node)
    })
    .unwrap_err();

    match err {
        DomainError::Mapping { index, source } => {
            assert_eq!(index, 2);
            assert!(matches!(*source, DomainError::InvalidRecord(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
#[case(Some(0), 3)]
#[case(Some(1), 6)]
#[case(None, 7)]
fn given_max_depth_when_building_then_deeper_nodes_pruned(
    org_rows: Vec<Row>,
    #[case] max_depth: Option<usize>,
    #[case] expected: usize,
) {
    let roots = ForestBuilder::new()
        .max_depth(max_depth)
        .build_from(org_rows, &map_row)
        .unwrap();
    assert_eq!(count_nodes(&roots), expected);
}
