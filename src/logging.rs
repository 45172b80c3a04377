//! Diagnostic logging.
//!
//! Engine code logs through `tracing`; only the binary installs a
//! subscriber.  Output goes to stderr so it never mixes with command
//! output on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `LPVAULT_LOG=debug`.
pub const LOG_ENV: &str = "LPVAULT_LOG";

/// Filter used when `LPVAULT_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber.  Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}
