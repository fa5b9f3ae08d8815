use std::{env, io::Stdout};

use tracing_subscriber::{fmt::Layer, prelude::*, EnvFilter};

/// Initializes a new tracing configuration.
///
/// - `rust_log`: Used when the `RUST_LOG` environment variable is not provided. You can set the default log level
///   (e.g. `warn`), or module-specific log levels as comma-separated entries like `path::to::module=log_level`, e.g.
///   `info,common::command=debug`
///
/// Logs go to stdout, as JSON when `JSON_LOGS` is set.
pub fn init_tracing(rust_log: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(rust_log));
    let json_logs = env::var_os("JSON_LOGS").is_some();

    if json_logs {
        let layer = Layer::new()
            .with_writer(std::io::stdout as fn() -> Stdout)
            .with_target(true)
            .json()
            .flatten_event(true)
            .with_span_list(false)
            .with_filter(filter);

        tracing_subscriber::registry().with(layer).init();
    } else {
        let layer = Layer::new()
            .with_writer(std::io::stdout as fn() -> Stdout)
            .with_target(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(layer).init();
    }
}
