use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const GRAPH: &str = "\
MNI Colin 27:
  MNI 152 ICBM 2009c Nonlinear Asymmetric: Colin27_to_MNI152.trm
MNI 152 ICBM 2009c Nonlinear Asymmetric:
  Big Brain (Histology): MNI152_to_BigBrain.ima
Big Brain (Histology): {}
";

fn backend() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spatial-backend"));
    cmd.env_remove("SPATIAL_BACKEND_SETTINGS")
        .env_remove("SPATIAL_BACKEND_GRAPH_FILE")
        .env_remove("INSTANCE_PATH")
        .env_remove("SPATIAL_BACKEND_INSTANCE_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn write_graph(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("graph.yaml");
    fs::write(&path, GRAPH).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    backend()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("chain"))
        .stdout(predicate::str::contains("graphviz"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("image-command"));
}

#[test]
fn test_image_command_help_lists_space_choices() {
    backend()
        .args(["image-command", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--server_address"))
        .stdout(predicate::str::contains("Infant Atlas"));
}

#[test]
fn test_image_command_rejects_unknown_space() {
    backend()
        .args(["image-command", "-i", "in.nii", "-o", "out.nii", "-s", "Waxholm Rat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_chain_prints_one_transform_per_line() {
    let dir = TempDir::new().unwrap();
    let graph = write_graph(&dir);
    backend()
        .arg("chain")
        .arg("--graph")
        .arg(&graph)
        .args(["MNI Colin 27", "Big Brain (Histology)"])
        .assert()
        .success()
        .stdout("Colin27_to_MNI152.trm\nMNI152_to_BigBrain.ima\n");
}

#[test]
fn test_chain_json_and_unreachable_pair() {
    let dir = TempDir::new().unwrap();
    let graph = write_graph(&dir);
    backend()
        .arg("chain")
        .arg("--graph")
        .arg(&graph)
        .arg("--json")
        .args(["Big Brain (Histology)", "MNI Colin 27"])
        .assert()
        .code(1)
        .stdout("null\n");

    backend()
        .arg("chain")
        .arg("--graph")
        .arg(&graph)
        .args(["MNI Colin 27", "Infant Atlas"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown space"));
}

#[test]
fn test_graphviz_writes_digraph() {
    let dir = TempDir::new().unwrap();
    let graph = write_graph(&dir);
    let output = dir.path().join("graph.dot");
    backend()
        .arg("graphviz")
        .arg("--graph")
        .arg(&graph)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();
    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph transforms {"));
    assert!(dot.contains("\tMNI_Colin_27 -> MNI_152_ICBM_2009c_Nonlinear_Asymmetric;"));
}

#[test]
fn test_check_fails_on_unreachable_pairs() {
    let dir = TempDir::new().unwrap();
    let graph = write_graph(&dir);
    backend()
        .arg("check")
        .arg("--graph")
        .arg(&graph)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("3 spaces, 2 links"))
        .stdout(predicate::str::contains(
            "unreachable: Big Brain (Histology) -> MNI Colin 27",
        ));
}
