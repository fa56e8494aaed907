//! Structured logging for the simulation.
//!
//! Enable with `--features tracing`. Without the feature every macro below
//! expands to nothing, so worker loops pay no cost for disabled logging.

/// Installs a `tracing` subscriber that tags each line with the worker thread.
///
/// The filter comes from `RUST_LOG` and defaults to `prodcon=debug`.
/// Does nothing if the `tracing` feature is not enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("prodcon=debug"));

    // `try_init` so repeated calls from tests are harmless.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_writer(std::io::stderr)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as info;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop as warn;
