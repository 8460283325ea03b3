//! Tests for the concurrent page-range pipeline, driven by mock extractors.

use std::collections::HashSet;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use quire_core::api::{PageRange, Pipeline, PipelineConfig, RangeExtractor, partition};
use quire_core::error::{PdfError, Result};

fn config(pages_per_unit: usize, threads: usize, timeout: Duration) -> PipelineConfig {
    PipelineConfig {
        max_pages_per_thread: pages_per_unit,
        max_concurrent_threads: threads,
        unit_timeout: timeout,
        full_logging: false,
    }
}

/// Returns `text{start}` after a per-range delay.
struct Delayed {
    delays_ms: Vec<u64>,
}

impl RangeExtractor for Delayed {
    fn extract(&self, _data: Bytes, range: PageRange) -> Result<String> {
        let delay = self.delays_ms.get(range.start).copied().unwrap_or(0);
        thread::sleep(Duration::from_millis(delay));
        Ok(format!("text{}", range.start))
    }
}

/// Fails, panics or hangs on selected ranges.
struct Faulty {
    fail: HashSet<usize>,
    panic: HashSet<usize>,
    hang: HashSet<usize>,
}

impl Faulty {
    fn new() -> Self {
        Self {
            fail: HashSet::new(),
            panic: HashSet::new(),
            hang: HashSet::new(),
        }
    }
}

impl RangeExtractor for Faulty {
    fn extract(&self, _data: Bytes, range: PageRange) -> Result<String> {
        if self.fail.contains(&range.start) {
            return Err(PdfError::SyntaxError(format!("bad range {range}")));
        }
        if self.panic.contains(&range.start) {
            panic!("extractor blew up on {range}");
        }
        if self.hang.contains(&range.start) {
            thread::sleep(Duration::from_secs(2));
        }
        Ok(format!("text{}", range.start))
    }
}

/// Records every range it is asked for.
struct Recording {
    seen: Mutex<Vec<PageRange>>,
}

impl RangeExtractor for Recording {
    fn extract(&self, data: Bytes, range: PageRange) -> Result<String> {
        self.seen.lock().unwrap().push(range);
        Ok(format!("{}:{}", range, data.len()))
    }
}

// ============================================================================
// Ordering
// ============================================================================

mod ordering_tests {
    use super::*;

    #[test]
    fn test_output_order_independent_of_completion_order() {
        let expected = "text0\ntext1\ntext2\ntext3\ntext4\ntext5";
        for delays_ms in [
            vec![0, 0, 0, 0, 0, 0],
            vec![60, 50, 40, 30, 20, 10],
            vec![10, 60, 0, 40, 20, 30],
        ] {
            let pipeline = Pipeline::new(
                config(1, 4, Duration::from_secs(10)),
                Delayed { delays_ms },
            )
            .unwrap();
            let extraction = pipeline.extract(Bytes::new(), 6);
            assert_eq!(extraction.text, expected);
            assert!(!extraction.is_partial());
            pipeline.shutdown();
        }
    }

    #[test]
    fn test_ranges_follow_partition() {
        let pipeline = Pipeline::new(
            config(3, 2, Duration::from_secs(10)),
            Recording {
                seen: Mutex::new(Vec::new()),
            },
        )
        .unwrap();
        let data = Bytes::from_static(b"12345");
        let extraction = pipeline.extract(data, 7);
        assert_eq!(extraction.text, "0..3:5\n3..6:5\n6..7:5");

        let mut seen = pipeline.extractor().seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, partition(7, 3));
    }

    #[test]
    fn test_zero_pages_is_empty() {
        let pipeline = Pipeline::new(
            config(10, 2, Duration::from_secs(1)),
            Delayed { delays_ms: vec![] },
        )
        .unwrap();
        let extraction = pipeline.extract(Bytes::new(), 0);
        assert_eq!(extraction.text, "");
        assert!(extraction.incomplete_ranges.is_empty());
    }

    #[test]
    fn test_pipeline_reused_across_documents() {
        let pipeline = Pipeline::new(
            config(2, 2, Duration::from_secs(10)),
            Delayed { delays_ms: vec![] },
        )
        .unwrap();
        assert_eq!(pipeline.extract(Bytes::new(), 3).text, "text0\ntext2");
        assert_eq!(pipeline.extract(Bytes::new(), 1).text, "text0");
    }
}

// ============================================================================
// Failures and timeouts
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_timed_out_unit_leaves_empty_slot() {
        let mut extractor = Faulty::new();
        extractor.hang.insert(1);
        let pipeline =
            Pipeline::new(config(1, 3, Duration::from_millis(200)), extractor).unwrap();

        let started = Instant::now();
        let extraction = pipeline.extract(Bytes::new(), 3);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(extraction.text, "text0\n\ntext2");
        assert_eq!(extraction.incomplete_ranges, vec![PageRange::new(1, 2)]);
    }

    #[test]
    fn test_queued_units_given_up_when_every_worker_hangs() {
        let mut extractor = Faulty::new();
        extractor.hang.insert(0);
        let pipeline =
            Pipeline::new(config(1, 1, Duration::from_millis(200)), extractor).unwrap();

        let started = Instant::now();
        let extraction = pipeline.extract(Bytes::new(), 3);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(extraction.text, "\n\n");
        assert_eq!(
            extraction.incomplete_ranges,
            vec![
                PageRange::new(0, 1),
                PageRange::new(1, 2),
                PageRange::new(2, 3)
            ]
        );

        // The only worker is still busy; the next document is bounded too.
        let started = Instant::now();
        let again = pipeline.extract(Bytes::new(), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(again.text, "");
        assert_eq!(again.incomplete_ranges, vec![PageRange::new(0, 1)]);
    }

    #[test]
    fn test_failed_unit_leaves_empty_slot() {
        let mut extractor = Faulty::new();
        extractor.fail.insert(0);
        let pipeline = Pipeline::new(config(2, 2, Duration::from_secs(10)), extractor).unwrap();

        let extraction = pipeline.extract(Bytes::new(), 5);
        assert_eq!(extraction.text, "\ntext2\ntext4");
        assert_eq!(extraction.incomplete_ranges, vec![PageRange::new(0, 2)]);
        assert!(extraction.is_partial());
    }

    #[test]
    fn test_panicking_unit_is_contained() {
        let mut extractor = Faulty::new();
        extractor.panic.insert(2);
        let pipeline = Pipeline::new(config(1, 2, Duration::from_secs(10)), extractor).unwrap();

        let extraction = pipeline.extract(Bytes::new(), 4);
        assert_eq!(extraction.text, "text0\ntext1\n\ntext3");
        assert_eq!(extraction.incomplete_ranges, vec![PageRange::new(2, 3)]);

        // Workers survive the panic.
        let again = pipeline.extract(Bytes::new(), 2);
        assert_eq!(again.text, "text0\ntext1");
    }

    #[test]
    fn test_every_unit_failing() {
        let mut extractor = Faulty::new();
        extractor.fail.extend([0, 1]);
        let mut config = config(1, 2, Duration::from_secs(10));
        config.full_logging = true;
        let pipeline = Pipeline::new(config, extractor).unwrap();

        let extraction = pipeline.extract(Bytes::new(), 2);
        assert_eq!(extraction.text, "\n");
        assert_eq!(extraction.incomplete_ranges.len(), 2);
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_invalid_config_rejected() {
        let result = Pipeline::new(
            config(0, 2, Duration::from_secs(1)),
            Delayed { delays_ms: vec![] },
        );
        assert!(matches!(result, Err(PdfError::InvalidConfig(_))));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_pages_per_thread, 10);
        assert_eq!(config.unit_timeout, Duration::from_secs(150));
        assert!(config.max_concurrent_threads >= 1);
        assert!(!config.full_logging);
    }

    #[test]
    fn test_page_range_display() {
        let range = PageRange::new(10, 20);
        assert_eq!(range.to_string(), "10..20");
        assert_eq!(range.len(), 10);
        assert!(PageRange::new(3, 3).is_empty());
    }
}
