//! HTTP delivery with retry and exponential backoff

use super::Sink;
use crate::core::config::{RemoteConfig, RetryPolicy};
use crate::core::{LogRecord, LoggerError, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::thread;

/// POSTs each record as JSON to a collector endpoint
///
/// A 2xx response is success. Client errors other than 429 are terminal;
/// network errors, 5xx and 429 are retried on the [`RetryPolicy`] schedule.
/// With an empty url or token the sink does nothing.
///
/// # Example
///
/// ```no_run
/// use sink_logger::config::RemoteConfig;
/// use sink_logger::sinks::RemoteSink;
///
/// let config = RemoteConfig {
///     url: "https://logs.example.com/ingest".to_string(),
///     token: "token".to_string(),
///     ..RemoteConfig::default()
/// };
/// let sink = RemoteSink::new(&config).expect("Failed to build HTTP client");
/// ```
pub struct RemoteSink {
    client: Client,
    url: String,
    token: String,
    retry: RetryPolicy,
}

impl RemoteSink {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                LoggerError::config("remote", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
            retry: config.retry,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.token.is_empty()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn attempt(&self, body: &[u8]) -> std::result::Result<(), Failure> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token)
            .body(body.to_vec())
            .send()
            .map_err(|e| Failure::Retryable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            Err(Failure::Terminal(format!("HTTP {}", status)))
        } else {
            Err(Failure::Retryable(format!("HTTP {}", status)))
        }
    }
}

enum Failure {
    Retryable(String),
    Terminal(String),
}

impl Sink for RemoteSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        if !self.is_configured() {
            return Ok(());
        }

        // Encoded once, reused by every attempt
        let body = serde_json::to_vec(record)?;
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                thread::sleep(self.retry.delay_before(attempt));
            }
            match self.attempt(&body) {
                Ok(()) => return Ok(()),
                Err(Failure::Terminal(message)) => {
                    return Err(LoggerError::remote(&self.url, attempt + 1, true, message));
                }
                Err(Failure::Retryable(message)) => last_error = message,
            }
        }

        Err(LoggerError::remote(&self.url, max_attempts, false, last_error))
    }

    fn name(&self) -> &str {
        "remote"
    }
}
