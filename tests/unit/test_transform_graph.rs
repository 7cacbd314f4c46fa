use spatial_backend::core::transform_graph::lint;
use spatial_backend::core::{GraphError, TransformGraph};
use std::fs;
use tempfile::TempDir;

const DEPLOYED_GRAPH: &str = r#"
MNI 152 ICBM 2009c Nonlinear Asymmetric:
  MNI Colin 27: MNI152_to_Colin27.trm
  Big Brain (Histology): MNI152_to_BigBrain.ima
MNI Colin 27:
  MNI 152 ICBM 2009c Nonlinear Asymmetric: inv:MNI152_to_Colin27.trm
Big Brain (Histology):
  MNI 152 ICBM 2009c Nonlinear Asymmetric: inv:MNI152_to_BigBrain.ima
Infant Atlas:
  MNI 152 ICBM 2009c Nonlinear Asymmetric: Infant_to_MNI152.trm
"#;

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[test]
fn test_graph_loads_from_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("graph.yaml");
    fs::write(&path, DEPLOYED_GRAPH).unwrap();

    let graph = TransformGraph::from_yaml_path(&path).unwrap();
    assert_eq!(graph.space_count(), 4);
    assert_eq!(graph.link_count(), 5);
    assert_eq!(
        graph
            .get_transform_chain("MNI Colin 27", "Big Brain (Histology)")
            .unwrap(),
        Some(ids(&[
            "inv:MNI152_to_Colin27.trm",
            "MNI152_to_BigBrain.ima"
        ]))
    );
}

#[test]
fn test_missing_graph_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = TransformGraph::from_yaml_path(&temp_dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, GraphError::Io(_)));
}

#[test]
fn test_identity_chain_for_registered_space() {
    let graph = TransformGraph::from_yaml_str(DEPLOYED_GRAPH, "deployed").unwrap();
    for space in graph.spaces() {
        assert_eq!(graph.get_transform_chain(space, space).unwrap(), Some(vec![]));
    }
}

#[test]
fn test_unreachable_and_unknown_spaces() {
    let graph = TransformGraph::from_yaml_str(DEPLOYED_GRAPH, "deployed").unwrap();
    // Nothing leads back into the infant atlas.
    assert_eq!(
        graph
            .get_transform_chain("MNI Colin 27", "Infant Atlas")
            .unwrap(),
        None
    );
    let err = graph
        .get_transform_chain("MNI Colin 27", "Waxholm Rat")
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownSpace(name) if name == "Waxholm Rat"));
}

#[test]
fn test_every_pair_round_trips_except_infant_target() {
    let graph = TransformGraph::from_yaml_str(DEPLOYED_GRAPH, "deployed").unwrap();
    let spaces: Vec<&str> = graph.spaces().collect();
    for source in &spaces {
        for target in &spaces {
            let chain = graph.get_transform_chain(source, target).unwrap();
            if *target == "Infant Atlas" && *source != "Infant Atlas" {
                assert!(chain.is_none(), "{} -> {}", source, target);
            } else {
                assert!(chain.is_some(), "{} -> {}", source, target);
            }
        }
    }
}

#[test]
fn test_duplicate_rejection_leaves_graph_unchanged() {
    let mut graph = TransformGraph::new();
    graph.add_space("A").unwrap();
    graph.add_space("B").unwrap();
    graph.add_link("A", "B", "A_to_B").unwrap();

    assert!(matches!(
        graph.add_space("A"),
        Err(GraphError::DuplicateSpace(_))
    ));
    assert!(matches!(
        graph.add_link("A", "B", "other"),
        Err(GraphError::DuplicateLink { .. })
    ));
    assert_eq!(graph.space_count(), 2);
    assert_eq!(
        graph.get_transform_chain("A", "B").unwrap(),
        Some(ids(&["A_to_B"]))
    );
}

#[test]
fn test_remove_missing_link_fails() {
    let mut graph = TransformGraph::new();
    graph.add_space("A").unwrap();
    graph.add_space("B").unwrap();
    assert!(matches!(
        graph.remove_link("A", "B"),
        Err(GraphError::MissingLink { .. })
    ));
}

#[test]
fn test_check_report_on_deployed_graph() {
    let graph = TransformGraph::from_yaml_str(DEPLOYED_GRAPH, "deployed").unwrap();
    let report = lint::lint(&graph);
    assert!(!report.is_fully_connected());
    assert_eq!(report.unreachable.len(), 3);
    assert!(report
        .unreachable
        .iter()
        .all(|(_, to)| to == "Infant Atlas"));
    assert!(report.ambiguous.is_empty());
}

#[test]
fn test_graphviz_export_of_deployed_graph() {
    let graph = TransformGraph::from_yaml_str(DEPLOYED_GRAPH, "deployed").unwrap();
    let dot = graph.to_graphviz().unwrap();
    assert!(dot.starts_with("digraph transforms {\n"));
    assert!(dot.contains("\tMNI_Colin_27 -> MNI_152_ICBM_2009c_Nonlinear_Asymmetric;\n"));
    assert!(dot.contains("\tBig_Brain__Histology_ -> MNI_152_ICBM_2009c_Nonlinear_Asymmetric;\n"));
    assert_eq!(dot.matches("->").count(), 5);
}
