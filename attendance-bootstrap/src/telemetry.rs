use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "attendance-tracker.log";

/// Console logging, plus a daily-rolling file when `log_dir` is set. Keep the
/// returned guard alive for as long as file output should be flushed.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Console-only logger for the steps that run before the config (and so
/// `log_dir`) is known.
pub fn bootstrap_dispatch() -> Dispatch {
    console_dispatch(std::io::stderr)
}

pub fn console_dispatch<W>(make_writer: W) -> Dispatch
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    Dispatch::new(
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_writer(make_writer)),
    )
}

pub fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = env_filter();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
    guard
}
