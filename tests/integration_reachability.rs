//! Integration tests for the remote-reachability probe.

mod common;

use std::time::Duration;
use tempfile::TempDir;

use common::{demo_repository_config, spawn_http_responder};
use gitseed::application::services::cloner::{ClonerConfig, GitCloner};
use gitseed::common::error::CloneError;
use gitseed::domain::entities::user::User;

#[tokio::test]
async fn test_construction_succeeds_once_remote_answers_ok() {
    let workspace = TempDir::new().unwrap();
    let addr = spawn_http_responder("200 OK").await;

    let config = ClonerConfig::new(
        vec![demo_repository_config()],
        workspace.path(),
        User::anonymous(),
        format!("http://{addr}"),
    )
    .with_wait_timeout(Duration::from_secs(30));

    assert!(GitCloner::new(config).await.is_ok());
}

#[tokio::test]
async fn test_server_errors_do_not_count_as_available() {
    let workspace = TempDir::new().unwrap();
    let addr = spawn_http_responder("500 Internal Server Error").await;

    // The remote is reachable but unhealthy; with a zero timeout the probe
    // gives up after the first attempt.
    let config = ClonerConfig::new(
        vec![demo_repository_config()],
        workspace.path(),
        User::anonymous(),
        format!("http://{addr}"),
    )
    .with_wait_timeout(Duration::ZERO);

    let error = GitCloner::new(config).await.unwrap_err();
    assert!(matches!(error, CloneError::RemoteUnavailable { .. }));
    assert_eq!(error.exit_code(), 201);
}

#[tokio::test]
async fn test_unreachable_remote_times_out() {
    let workspace = TempDir::new().unwrap();

    let config = ClonerConfig::new(
        vec![demo_repository_config()],
        workspace.path(),
        User::anonymous(),
        // A port nothing listens on.
        "http://127.0.0.1:1",
    )
    .with_wait_timeout(Duration::ZERO);

    let error = GitCloner::new(config).await.unwrap_err();
    assert!(matches!(error, CloneError::RemoteUnavailable { .. }));
}

#[tokio::test]
async fn test_empty_repository_list_skips_the_probe() {
    let workspace = TempDir::new().unwrap();

    // No repositories means no probe: an unroutable URL must not matter and
    // construction must return immediately.
    let config = ClonerConfig::new(
        vec![],
        workspace.path(),
        User::anonymous(),
        "http://127.0.0.1:1",
    );

    let mut cloner = GitCloner::new(config).await.unwrap();
    assert!(cloner.run(&[]).await.is_ok());
}
