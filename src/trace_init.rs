#[cfg(feature = "trace")]
use std::path::Path;
#[cfg(feature = "trace")]
use std::sync::Once;

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// Install a JSON-lines subscriber writing to `log_dir/ink-trace.jsonl`.
/// Only the first call has an effect. `RUST_LOG` overrides the filter.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) {
    INIT.call_once(|| {
        let file_appender = tracing_appender::rolling::never(log_dir, "ink-trace.jsonl");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        // Flushing stops when the guard drops; keep it for the process lifetime.
        std::mem::forget(guard);

        let default_filter = "ink_engine=debug,ink_session=debug,ink_core=debug";
        let _ = tracing_subscriber::fmt()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .try_init();
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &std::path::Path) {}
