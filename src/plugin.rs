use lazy_static::lazy_static;
use slog::{debug, error, Logger};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Mutex;
use std::time::Instant;

/// A single gauge reading, tagged for the dispatch pipeline.
///
/// Built fresh on every read and moved into the sink; nothing is retained
/// on the plugin side.
#[derive(Debug)]
pub struct Sample {
    /// Gauge value: an instantaneous reading, not a counter.
    pub value: f64,
    pub plugin_name: String,
    pub type_name: String,
    pub host: String,
}

/// Ingestion entrypoint of the host pipeline. Queuing, batching and
/// writing are the sink's concern.
pub trait MetricsSink: Send + Sync {
    fn submit(&self, sample: Sample);
}

/// A plugin invoked once per scheduling tick. One read per call; the
/// scheduler decides when the next attempt happens.
pub trait ReadPlugin: Send + Sync {
    fn read(&self) -> Result<(), ReadError>;
}

#[derive(Debug)]
pub enum ReadError {
    /// The platform data source could not be opened.
    SourceUnavailable(io::Error),
    /// The source opened but yielded no data.
    ReadFailure(io::Error),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::SourceUnavailable(err) => write!(f, "source unavailable: {}", err),
            ReadError::ReadFailure(err) => write!(f, "read failed: {}", err),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadError::SourceUnavailable(err) | ReadError::ReadFailure(err) => Some(err),
        }
    }
}

lazy_static! {
    static ref READ_PLUGINS: Mutex<HashMap<String, Box<dyn ReadPlugin>>> =
        Mutex::new(HashMap::new());
}

/// Registers a read plugin under `name`. A later registration with the
/// same name replaces the earlier one.
pub fn register_read(name: &str, plugin: Box<dyn ReadPlugin>) {
    READ_PLUGINS.lock().unwrap().insert(name.to_string(), plugin);
}

/// Runs every registered read plugin once, logging each outcome.
pub fn read_all(logger: &Logger) {
    let plugins = READ_PLUGINS.lock().unwrap();
    for (name, plugin) in plugins.iter() {
        let start = Instant::now();
        let result = plugin.read();
        let duration = start.elapsed();
        match result {
            Ok(()) => debug!(logger, "plugin read succeeded";
                "plugin" => name.as_str(),
                "duration_seconds" => duration.as_secs_f64()),
            Err(err) => error!(logger, "plugin read failed";
                "plugin" => name.as_str(),
                "duration_seconds" => duration.as_secs_f64(),
                "err" => %err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Discard};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingPlugin {
        calls: Arc<AtomicUsize>,
    }

    impl ReadPlugin for CountingPlugin {
        fn read(&self) -> Result<(), ReadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_read_all_drives_registered_plugin() {
        let calls = Arc::new(AtomicUsize::new(0));
        register_read("counting", Box::new(CountingPlugin { calls: calls.clone() }));
        let logger = Logger::root(Discard, o!());

        read_all(&logger);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        read_all(&logger);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
