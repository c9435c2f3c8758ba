use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `rbiblia=debug`).
pub const LOG_ENV: &str = "RBIBLIA_LOG";

const DEFAULT_FILTER: &str = "rbiblia=info";

/// Install the global tracing subscriber.
///
/// Logs go to a daily file under `$XDG_DATA_HOME/rbiblia/logs` so they don't
/// interleave with chapter output; stderr is used when no data directory
/// exists. Keep the returned guard alive until exit to flush buffered lines.
pub fn init() -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let (writer, guard) = match dirs::data_dir() {
    Some(data_dir) => {
      let appender = tracing_appender::rolling::daily(data_dir.join("rbiblia").join("logs"), "rbiblia.log");
      tracing_appender::non_blocking(appender)
    }
    None => tracing_appender::non_blocking(std::io::stderr()),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| color_eyre::eyre::eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
