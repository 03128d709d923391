use std::sync::Mutex;
use std::time::Duration;

use once_cell::sync::Lazy;
use tabfetch::{ClientOptions, HttpTabClient};
use tracing_subscriber::EnvFilter;

static TRACING_SUBSCRIBER: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn init_tracing() {
    Lazy::force(&TRACING_SUBSCRIBER);
}

/// Client pointed at a mock server with a short timeout.
pub fn client_for(url: &str, request_timeout: Duration) -> HttpTabClient {
    let options = ClientOptions {
        request_timeout,
        ..ClientOptions::default()
    };
    HttpTabClient::with_options(url, options).expect("mock client should build")
}

/// Collects `(index, identifier, success)` triples from a batch observer.
#[derive(Default)]
pub struct ObservedItems {
    items: Mutex<Vec<(usize, String, bool)>>,
}

impl ObservedItems {
    pub fn record(&self, index: usize, identifier: &str, success: bool) {
        self.items
            .lock()
            .expect("observed items poisoned")
            .push((index, identifier.to_owned(), success));
    }

    pub fn indices(&self) -> Vec<usize> {
        self.items
            .lock()
            .expect("observed items poisoned")
            .iter()
            .map(|(index, _, _)| *index)
            .collect()
    }

    pub fn successes(&self) -> Vec<bool> {
        self.items
            .lock()
            .expect("observed items poisoned")
            .iter()
            .map(|(_, _, success)| *success)
            .collect()
    }
}
