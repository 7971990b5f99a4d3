use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

fn filter(debug: bool) -> EnvFilter {
    // Without debug logging we force `info` so a stray `RUST_LOG` in the
    // environment cannot turn on verbose output.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Build the subscriber without installing it. Output goes to `log_file`
/// (never rotated) when given, to stdout otherwise.
pub fn subscriber(debug: bool, log_file: Option<&Path>) -> Box<dyn Subscriber + Send + Sync> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));
    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "dashboard_presets.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            Box::new(builder.with_writer(appender).with_ansi(false).finish())
        }
        None => Box::new(builder.finish()),
    }
}

/// Install the global subscriber. `debug` lets `RUST_LOG` choose the level,
/// defaulting to `debug`; otherwise the level is fixed at `info`. A second
/// call is ignored.
pub fn init(debug: bool, log_file: Option<&Path>) {
    let _ = tracing::subscriber::set_global_default(subscriber(debug, log_file));
}
