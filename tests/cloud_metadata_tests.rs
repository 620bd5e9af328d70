#![cfg(feature = "stackdriver")]
//! Metadata discovery against a stand-in metadata server.

use std::net::TcpListener;

use rstest::rstest;
use ulogger::{
    CloudLoggingHandlerBuilder,
    cloud::{CloudError, MetadataClient, test_support::MetadataServer},
};

const PROJECT: &str = "/project/project-id";
const NAME: &str = "/instance/name";
const ID: &str = "/instance/id";
const ZONE: &str = "/instance/zone";

fn healthy_routes() -> Vec<(&'static str, u16, &'static str)> {
    vec![
        (PROJECT, 200, "proj-1"),
        (NAME, 200, "web-1"),
        (ID, 200, "1234"),
        (ZONE, 200, "projects/99/zones/us-east1-b"),
    ]
}

fn paths(server: &MetadataServer) -> Vec<String> {
    server.requests().into_iter().map(|r| r.path).collect()
}

#[rstest]
fn discovers_instance_identity() {
    let server = MetadataServer::spawn(healthy_routes());
    let builder = CloudLoggingHandlerBuilder::with_metadata(
        "prog",
        None,
        MetadataClient::with_endpoint(server.base_url()),
    )
    .expect("metadata lookups succeed");
    assert_eq!(builder.project_id(), "proj-1");
    assert_eq!(builder.hostname(), "web-1");
    assert_eq!(builder.instance_id(), "1234");
    assert_eq!(builder.zone(), "us-east1-b");
    assert_eq!(builder.log_name(), "prog");
    assert_eq!(paths(&server), vec![PROJECT, NAME, ID, ZONE]);
}

#[rstest]
fn explicit_project_skips_lookup() {
    let server = MetadataServer::spawn(healthy_routes());
    let builder = CloudLoggingHandlerBuilder::with_metadata(
        "prog",
        Some("given".into()),
        MetadataClient::with_endpoint(server.base_url()),
    )
    .expect("metadata lookups succeed");
    assert_eq!(builder.project_id(), "given");
    assert!(!paths(&server).iter().any(|p| p == PROJECT));
}

#[rstest]
fn empty_body_is_reported() {
    let server = MetadataServer::spawn(vec![(PROJECT, 200, "")]);
    let err = MetadataClient::with_endpoint(server.base_url())
        .project_id()
        .unwrap_err();
    assert!(matches!(err, CloudError::EmptyMetadata { ref url } if url.ends_with(PROJECT)));
}

#[rstest]
fn error_status_names_the_key() {
    let server = MetadataServer::spawn(vec![(PROJECT, 200, "proj-1"), (NAME, 500, "")]);
    let err = CloudLoggingHandlerBuilder::with_metadata(
        "prog",
        None,
        MetadataClient::with_endpoint(server.base_url()),
    )
    .unwrap_err();
    match err {
        CloudError::Metadata { key, data_type, .. } => {
            assert_eq!(key, "name");
            assert_eq!(data_type, "instance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn unreachable_server_is_a_metadata_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let err = MetadataClient::with_endpoint(format!("http://127.0.0.1:{port}"))
        .project_id()
        .unwrap_err();
    assert!(matches!(err, CloudError::Metadata { .. }), "{err}");
    assert!(err.to_string().contains("project-id"), "{err}");
}
