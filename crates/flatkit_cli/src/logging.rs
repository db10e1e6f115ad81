//! Log setup for the `flatkit` binary.
//!
//! `RUST_LOG` takes precedence over the verbosity flags:
//! ```bash
//! RUST_LOG=flatkit_io_fs=debug flatkit flatten src -d out
//! ```

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Map `-q` / `-v` counts to a filter directive.
///
/// Default is `info`, so every copy record and skip notice is visible.
pub fn level_for(n_verbose: u8, if_quiet: bool) -> &'static str {
    if if_quiet {
        return "warn";
    }
    match n_verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize logging. Only the first call takes effect.
pub fn init(n_verbose: u8, if_quiet: bool) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(level_for(n_verbose, if_quiet))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_ansi(std::io::stdout().is_terminal())
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}
