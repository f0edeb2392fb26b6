use slog::{info, o, Drain, Logger};
use std::sync::Arc;
use std::time::Duration;

mod entropy;
#[cfg(target_os = "linux")]
mod entropy_linux;
#[cfg(target_os = "netbsd")]
mod entropy_netbsd;
mod plugin;

use entropy::EntropyProbe;
use plugin::{MetricsSink, Sample};

const READ_INTERVAL: Duration = Duration::from_secs(10);

/// Stand-in for the host pipeline: writes every submitted sample to the
/// log instead of queuing it for a writer backend.
struct LogSink {
    logger: Logger,
}

impl MetricsSink for LogSink {
    fn submit(&self, sample: Sample) {
        info!(self.logger, "dispatching values";
            "plugin" => sample.plugin_name,
            "type" => sample.type_name,
            "host" => sample.host,
            "value" => sample.value);
    }
}

fn hostname() -> String {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return "localhost".to_string();
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

#[tokio::main]
async fn main() {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let logger = Logger::root(drain, o!());

    let sink = Arc::new(LogSink { logger: logger.clone() });
    let probe = EntropyProbe::new(entropy::default_source(), sink, hostname());
    plugin::register_read(entropy::PLUGIN_NAME, Box::new(probe));

    info!(logger, "Starting entropy probe"; "interval_seconds" => READ_INTERVAL.as_secs());
    let mut ticker = tokio::time::interval(READ_INTERVAL);
    loop {
        ticker.tick().await;
        plugin::read_all(&logger);
    }
}
