use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tabfetch::render::{display_text, download_filename};
use tabfetch::{BatchOrchestrator, BatchResult, ClientConfig, HttpTabClient};
use tokio_util::sync::CancellationToken;

const DEFAULT_LOG_DIRECTIVE: &str = "warn";
const URLS_ENV: &str = "TABFETCH_URLS";

#[tokio::main]
async fn main() -> Result<()> {
    init_example_tracing();

    let identifiers = read_identifiers()?;
    let config = ClientConfig::from_env()?;
    let client = Arc::new(HttpTabClient::from_config(&config)?);

    let status = client.health_status().await;
    ensure!(
        status.is_healthy(),
        "tab service at {} is not reachable: {:?}",
        client.endpoint(),
        status
    );

    let bar = build_progress_bar(identifiers.len() as u64);
    bar.println(format!(
        "Fetching {} tabs from {}",
        identifiers.len(),
        client.endpoint()
    ));

    let shutdown = CancellationToken::new();
    let ctrl_c = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        })
    };

    let orchestrator = BatchOrchestrator::new(client.clone());
    let started = Instant::now();
    let batch = orchestrator
        .process_batch_observed(&identifiers, Some(&shutdown), |item| {
            bar.set_message(download_filename(item.identifier()));
            bar.inc(1);
        })
        .await?;
    ctrl_c.abort();

    if shutdown.is_cancelled() {
        bar.abandon_with_message("stopped by Ctrl-C");
    } else {
        bar.finish_with_message("done");
    }

    print_tabs(&bar, &batch)?;
    print_summary(&bar, &batch, started.elapsed());
    Ok(())
}

fn init_example_tracing() {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", DEFAULT_LOG_DIRECTIVE);
    }
    tabfetch::init_tracing();
}

fn read_identifiers() -> Result<Vec<String>> {
    let mut identifiers: Vec<String> = env::args().skip(1).collect();
    if identifiers.is_empty() {
        let joined = env::var(URLS_ENV)
            .with_context(|| format!("pass tab URLs as arguments or set {URLS_ENV}"))?;
        identifiers = joined
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect();
    }
    ensure!(!identifiers.is_empty(), "{URLS_ENV} did not contain any URLs");
    Ok(identifiers)
}

fn build_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stdout_with_hz(12));
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tabs {msg}",
    )
    .expect("valid progress bar template")
    .progress_chars("=>-");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn print_tabs(bar: &ProgressBar, batch: &BatchResult) -> Result<()> {
    for item in batch.in_input_order() {
        match (item.data(), item.error()) {
            (Some(record), _) => {
                match (record.title.as_deref(), record.artist_name.as_deref()) {
                    (Some(title), Some(artist)) => bar.println(format!("== {title} by {artist} ==")),
                    (Some(title), None) => bar.println(format!("== {title} ==")),
                    _ => bar.println(format!("== {} ==", download_filename(item.identifier()))),
                }
                bar.println(display_text(record)?);
            }
            (None, Some(error)) => {
                bar.println(format!("!! {}: {}", item.identifier(), error.message()));
            }
            (None, None) => {}
        }
    }
    Ok(())
}

fn print_summary(bar: &ProgressBar, batch: &BatchResult, elapsed: Duration) {
    bar.println(format!(
        "Fetched {}/{} tabs ({} failed) in {:.2}s",
        batch.successful_count(),
        batch.total(),
        batch.failed_count(),
        elapsed.as_secs_f64()
    ));
}
