use crate::plugin::{MetricsSink, ReadError, ReadPlugin, Sample};
use std::sync::Arc;

#[cfg(target_os = "linux")]
use crate::entropy_linux::ProcFsSource;
#[cfg(target_os = "netbsd")]
use crate::entropy_netbsd::RandomDeviceSource;

#[cfg(not(any(target_os = "linux", target_os = "netbsd")))]
compile_error!("no applicable entropy input method for this target");

pub const PLUGIN_NAME: &str = "entropy";

/// A platform source for the kernel's available-entropy estimate, in bits.
pub trait EntropySource: Send + Sync {
    fn read(&self) -> Result<f64, ReadError>;
}

/// Reads the entropy-pool estimate once per tick and submits it as a
/// gauge. Stateless: consecutive reads are fully independent.
pub struct EntropyProbe {
    source: Box<dyn EntropySource>,
    sink: Arc<dyn MetricsSink>,
    host: String,
}

impl EntropyProbe {
    pub fn new(source: Box<dyn EntropySource>, sink: Arc<dyn MetricsSink>, host: String) -> Self {
        EntropyProbe { source, sink, host }
    }

    fn submit(&self, entropy: f64) {
        self.sink.submit(Sample {
            value: entropy,
            plugin_name: PLUGIN_NAME.to_string(),
            type_name: PLUGIN_NAME.to_string(),
            host: self.host.clone(),
        });
    }
}

impl ReadPlugin for EntropyProbe {
    /// A non-positive estimate is "no reading available": nothing is
    /// submitted and the call still succeeds.
    fn read(&self) -> Result<(), ReadError> {
        let entropy = self.source.read()?;
        if entropy > 0.0 {
            self.submit(entropy);
        }
        Ok(())
    }
}

/// The input method for the build target.
#[cfg(target_os = "linux")]
pub fn default_source() -> Box<dyn EntropySource> {
    Box::new(ProcFsSource::new("/proc"))
}

#[cfg(target_os = "netbsd")]
pub fn default_source() -> Box<dyn EntropySource> {
    Box::new(RandomDeviceSource::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    struct FixedSource {
        value: f64,
    }

    impl EntropySource for FixedSource {
        fn read(&self) -> Result<f64, ReadError> {
            Ok(self.value)
        }
    }

    struct FailingSource;

    impl EntropySource for FailingSource {
        fn read(&self) -> Result<f64, ReadError> {
            Err(ReadError::SourceUnavailable(io::Error::new(
                io::ErrorKind::NotFound,
                "missing",
            )))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        samples: Mutex<Vec<Sample>>,
    }

    impl MetricsSink for RecordingSink {
        fn submit(&self, sample: Sample) {
            self.samples.lock().unwrap().push(sample);
        }
    }

    fn probe_with(source: Box<dyn EntropySource>, sink: Arc<RecordingSink>) -> EntropyProbe {
        EntropyProbe::new(source, sink, "testhost".to_string())
    }

    #[test]
    fn test_positive_reading_submits_one_sample() {
        let sink = Arc::new(RecordingSink::default());
        let probe = probe_with(Box::new(FixedSource { value: 1234.0 }), sink.clone());

        probe.read().expect("read failed");

        let samples = sink.samples.lock().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, 1234.0);
        assert_eq!(samples[0].plugin_name, "entropy");
        assert_eq!(samples[0].type_name, "entropy");
        assert_eq!(samples[0].host, "testhost");
    }

    #[test]
    fn test_zero_reading_submits_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let probe = probe_with(Box::new(FixedSource { value: 0.0 }), sink.clone());

        probe.read().expect("read failed");

        assert!(sink.samples.lock().unwrap().is_empty());
    }

    #[test]
    fn test_negative_reading_submits_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let probe = probe_with(Box::new(FixedSource { value: -1.0 }), sink.clone());

        probe.read().expect("read failed");

        assert!(sink.samples.lock().unwrap().is_empty());
    }

    #[test]
    fn test_source_error_propagates_without_sample() {
        let sink = Arc::new(RecordingSink::default());
        let probe = probe_with(Box::new(FailingSource), sink.clone());

        assert!(probe.read().is_err());
        assert!(sink.samples.lock().unwrap().is_empty());
    }

    #[test]
    fn test_consecutive_reads_are_independent() {
        let sink = Arc::new(RecordingSink::default());
        let probe = probe_with(Box::new(FixedSource { value: 42.0 }), sink.clone());

        probe.read().expect("first read failed");
        probe.read().expect("second read failed");

        let samples = sink.samples.lock().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, 42.0);
        assert_eq!(samples[1].value, 42.0);
    }
}
