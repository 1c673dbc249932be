//! Command-line host for the cookie consent configuration engine.
//!
//! Re-exports the configuration crate and exposes the command runner used
//! by the `cookieconsent` binary.

mod cli;

/// Re-export for convenience.
pub use cookieconsent_rs_config as config;

pub use cli::{Cli, Command, run};

/// Initialize logging with millisecond timestamps and `RUST_LOG` filters.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
