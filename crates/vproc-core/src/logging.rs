//! Tracing setup and structured request logging.

use tracing::{info, warn};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use vproc_models::RequestId;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` is honored; `vproc=info` is always added. Set `LOG_FORMAT=json`
/// for JSON output, otherwise colored text is used. Calling this twice is
/// harmless: the second install attempt is ignored.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "vproc=info".parse::<Directive>() {
        env_filter = env_filter.add_directive(directive);
    }

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()
    };

    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Request logger for consistent lifecycle log lines.
///
/// Every line carries the request ID and the operation being performed.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: String,
    operation: String,
}

impl RequestLogger {
    pub fn new(request_id: &RequestId, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request started: {}", message
        );
    }

    /// Log an expected business rejection. Not an error.
    pub fn log_rejected(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request rejected: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Request completed: {}", message
        );
    }
}
