use std::time::Duration;

use crate::support::{
    helpers::{client_for, init_tracing},
    mock_tab::{sample_blocks, sample_lines, MockTabServer, MockTabService, TabReply, LINES_ROUTE},
};
use anyhow::Result;
use serde_json::json;
use tabfetch::render::display_text;
use tabfetch::{render, ClientError, ClientOptions, HttpTabClient, TabFetcher};

const SONG: &str = "https://tabs.ultimate-guitar.com/tab/phil-wickham/what-an-awesome-god-chords-5749718";

fn client_error(err: &anyhow::Error) -> Option<&ClientError> {
    err.downcast_ref::<ClientError>()
}

#[tokio::test]
async fn parse_tab_decodes_grouped_blocks() -> Result<()> {
    init_tracing();
    let service = MockTabService::new().tab(SONG, sample_blocks());
    let server = MockTabServer::start(service.clone()).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    let record = client.parse_tab(SONG).await?;

    assert!(!record.has_lines());
    assert_eq!(record.blocks.len(), 2);
    assert_eq!(record.lyrics_view()?, "What an awesome God");
    assert_eq!(record.tabs_view()?, "G   D");
    assert_eq!(display_text(&record)?, "What an awesome God\n\nG   D");
    assert_eq!(service.requests(), vec![SONG.to_owned()]);

    let metrics = client.metrics();
    assert_eq!(metrics.total_requests, 1);
    assert_eq!(metrics.total_errors, 0);

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_tab_lines_decodes_wrapped_record_and_renders() -> Result<()> {
    init_tracing();
    let service = MockTabService::new()
        .tab(SONG, sample_blocks())
        .lines_tab(SONG, sample_lines("What an Awesome God"));
    let server = MockTabServer::start(service).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    let record = client.parse_tab_lines(SONG).await?;

    assert_eq!(record.title.as_deref(), Some("What an Awesome God"));
    assert!(record.has_lines());
    assert_eq!(
        render(&record.lines)?.to_string(),
        "G   D\nWhat an awesome God\n"
    );
    assert_eq!(display_text(&record)?, "G   D\nWhat an awesome God\n");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn tab_path_option_selects_the_endpoint() -> Result<()> {
    init_tracing();
    let service = MockTabService::new().lines_tab(SONG, sample_lines("Via options"));
    let server = MockTabServer::start(service).await?;
    let options = ClientOptions {
        request_timeout: Duration::from_secs(5),
        tab_path: LINES_ROUTE.to_owned(),
        ..ClientOptions::default()
    };
    let client = HttpTabClient::with_options(server.url(), options)?;

    let record = client.fetch(SONG).await?;

    assert_eq!(record.title.as_deref(), Some("Via options"));
    assert_eq!(record.lines.len(), 3);

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn non_success_status_surfaces_service_message() -> Result<()> {
    init_tracing();
    let service = MockTabService::new()
        .reply("bad", TabReply::failure(500, "Failed to fetch page"))
        .reply("opaque", TabReply::raw_failure(502, "<html>Bad Gateway</html>"));
    let server = MockTabServer::start(service).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    let err = client.parse_tab("bad").await.unwrap_err();
    assert_eq!(
        client_error(&err),
        Some(&ClientError::Status {
            status: 500,
            message: "Failed to fetch page".into(),
        })
    );

    let err = client.parse_tab("opaque").await.unwrap_err();
    assert_eq!(
        client_error(&err),
        Some(&ClientError::Status {
            status: 502,
            message: "Failed to parse tab".into(),
        })
    );

    let err = client.parse_tab("unknown").await.unwrap_err();
    assert!(matches!(
        client_error(&err),
        Some(ClientError::Status { status: 404, .. })
    ));

    let metrics = client.metrics();
    assert_eq!(metrics.total_requests, 3);
    assert_eq!(metrics.total_errors, 3);

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn error_block_in_success_response_is_a_failure() -> Result<()> {
    init_tracing();
    let service = MockTabService::new().tab(
        "blocked",
        json!({ "blocks": [{ "error": "Tab is a pro-only format" }] }),
    );
    let server = MockTabServer::start(service).await?;
    let client = client_for(server.url(), Duration::from_secs(5));

    let err = client.fetch("blocked").await.unwrap_err();

    assert_eq!(
        client_error(&err),
        Some(&ClientError::Backend("Tab is a pro-only format".into()))
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn slow_service_times_out() -> Result<()> {
    init_tracing();
    let service = MockTabService::new().reply(
        "slow",
        TabReply::Slow {
            delay: Duration::from_secs(2),
            payload: sample_blocks(),
        },
    );
    let server = MockTabServer::start(service).await?;
    let client = client_for(server.url(), Duration::from_millis(200));

    let err = client.parse_tab("slow").await.unwrap_err();

    assert!(
        matches!(client_error(&err), Some(ClientError::Timeout { .. })),
        "expected timeout, got {err:#}"
    );
    assert!(err.to_string().contains("took too long to respond"));
    assert_eq!(client.metrics().total_timeouts, 1);

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn oversized_response_is_rejected() -> Result<()> {
    init_tracing();
    let service = MockTabService::new().tab(SONG, sample_lines(&"x".repeat(512)));
    let server = MockTabServer::start(service).await?;
    let options = ClientOptions {
        request_timeout: Duration::from_secs(5),
        max_response_body_bytes: 64,
        ..ClientOptions::default()
    };
    let client = HttpTabClient::with_options(server.url(), options)?;

    let err = client.parse_tab(SONG).await.unwrap_err();

    assert_eq!(
        client_error(&err),
        Some(&ClientError::ResponseTooLarge { limit: 64 })
    );

    server.shutdown().await;
    Ok(())
}
