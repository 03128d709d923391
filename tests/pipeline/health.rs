use std::sync::Arc;
use std::time::Duration;

use crate::support::{
    helpers::{client_for, init_tracing},
    mock_tab::{MockTabServer, MockTabService},
};
use anyhow::Result;
use tabfetch::{HealthProbe, HealthStatus};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn html_health_page_is_summarized() -> Result<()> {
    init_tracing();
    let server = MockTabServer::start(MockTabService::new()).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    let body = client.test_connection().await?;
    assert!(body.starts_with("<!DOCTYPE html>"));

    match client.health_status().await {
        HealthStatus::Healthy { message, .. } => assert_eq!(message, "API server is running"),
        other => panic!("expected healthy status, got {other:?}"),
    }

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn plain_health_body_is_kept_and_errors_are_unhealthy() -> Result<()> {
    init_tracing();
    let service = MockTabService::new();
    service.set_health(200, "Tab API OK");
    let server = MockTabServer::start(service.clone()).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    match client.health_status().await {
        HealthStatus::Healthy { message, .. } => assert_eq!(message, "Tab API OK"),
        other => panic!("expected healthy status, got {other:?}"),
    }

    service.set_health(503, "maintenance");
    assert!(client.test_connection().await.is_err());
    let status = client.health_status().await;
    assert!(!status.is_healthy());

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn health_watch_publishes_status_changes() -> Result<()> {
    init_tracing();
    let service = MockTabService::new();
    let server = MockTabServer::start(service.clone()).await?;
    let client = Arc::new(client_for(server.url(), Duration::from_secs(5)));
    let shutdown = CancellationToken::new();

    let (mut status_rx, handle) =
        HealthProbe::spawn(client, Duration::from_millis(50), shutdown.clone());

    status_rx.changed().await?;
    assert!(status_rx
        .borrow()
        .as_ref()
        .is_some_and(HealthStatus::is_healthy));

    service.set_health(500, "down");
    let became_unhealthy = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if status_rx.changed().await.is_err() {
                return false;
            }
            if status_rx
                .borrow()
                .as_ref()
                .is_some_and(|status| !status.is_healthy())
            {
                return true;
            }
        }
    })
    .await?;
    assert!(became_unhealthy);

    shutdown.cancel();
    handle.await?;
    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn cancelling_health_watch_abandons_slow_check() -> Result<()> {
    init_tracing();
    let service = MockTabService::new();
    service.set_health_delay(Duration::from_secs(3));
    let server = MockTabServer::start(service).await?;
    let client = Arc::new(client_for(server.url(), Duration::from_secs(30)));
    let shutdown = CancellationToken::new();

    let (status_rx, handle) =
        HealthProbe::spawn(client, Duration::from_secs(60), shutdown.clone());

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("cancellation should not wait for the slow health check")?;
    assert!(status_rx.borrow().is_none());

    server.shutdown().await;
    Ok(())
}
