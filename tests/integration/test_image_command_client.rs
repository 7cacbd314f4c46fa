use serde_json::json;
use spatial_backend::cli::image_command::{format_command, ImageCommandClient};
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_command_sends_spaces_and_auto_coords() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/get-image-transform-command"))
        .and(query_param("source_space", "MNI Colin 27"))
        .and(query_param("target_space", "Big Brain (Histology)"))
        .and(query_param("input_coords", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transform_command": [
                "AimsApplyTransform",
                "--inverse-transform", "BigBrain_to_MNI152.ima",
                "--inverse-transform", "MNI152_to_Colin27.trm",
                "--reference", "BigBrain_to_MNI152.ima",
                "--input-coords", "auto"
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ImageCommandClient::new(&mock_server.uri()).unwrap();
    let command = client
        .fetch_command("MNI Colin 27", "Big Brain (Histology)")
        .await
        .unwrap();
    assert_eq!(command.len(), 9);

    let local = format_command(
        &command,
        Path::new("/instance"),
        "colin.nii.gz",
        "colin_in_bigbrain.nii.gz",
        &[],
    )
    .unwrap();
    assert_eq!(local[2], "/instance/BigBrain_to_MNI152.ima");
    assert_eq!(local[4], "/instance/MNI152_to_Colin27.trm");
    assert_eq!(local[6], "/instance/BigBrain_to_MNI152.ima");
    assert_eq!(&local[9..], ["-i", "colin.nii.gz", "-o", "colin_in_bigbrain.nii.gz"]);
}

#[tokio::test]
async fn test_fetch_command_surfaces_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/get-image-transform-command"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "SB-UNKNOWN-SPACE", "message": "unknown space" }
        })))
        .mount(&mock_server)
        .await;

    let client = ImageCommandClient::new(&mock_server.uri()).unwrap();
    let err = client
        .fetch_command("MNI Colin 27", "Infant Atlas")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(message.contains("SB-UNKNOWN-SPACE"));
}

#[tokio::test]
async fn test_fetch_command_rejects_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/get-image-transform-command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "command": [] })))
        .mount(&mock_server)
        .await;

    let client = ImageCommandClient::new(&mock_server.uri()).unwrap();
    assert!(client
        .fetch_command("MNI Colin 27", "Infant Atlas")
        .await
        .is_err());
}
