//! Concurrent page-range extraction.
//!
//! A document's pages are split into contiguous ranges of at most
//! `max_pages_per_thread` pages. Each range runs on a fixed-size worker
//! pool against its own view of the document bytes. Results land in one
//! slot per range and are joined in range order, so completion order never
//! shows in the output.
//!
//! A range that fails or outlives `unit_timeout` leaves its slot empty and
//! is reported in `Extraction::incomplete_ranges`. Ranges still queued when
//! every worker is held by a timed-out range are given up the same way.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use bytes::Bytes;
use itertools::Itertools;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error};

use super::high_level::{ExtractOptions, extract_text_with_document};
use crate::document::PDFDocument;
use crate::error::{PdfError, Result};
use crate::image::ImageDescriber;

const DEFAULT_PAGES_PER_THREAD: usize = 10;
const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(150);

/// Half-open range of zero-based page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Split `[0, page_count)` into `ceil(page_count / chunk)` ranges starting at
/// `0, chunk, 2 * chunk, ...`.
///
/// `chunk` must be positive; `PipelineConfig::validate` guarantees that.
pub fn partition(page_count: usize, chunk: usize) -> Vec<PageRange> {
    (0..page_count)
        .step_by(chunk.max(1))
        .map(|start| PageRange::new(start, (start + chunk.max(1)).min(page_count)))
        .collect()
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pages per unit of work.
    pub max_pages_per_thread: usize,
    /// Worker pool size.
    pub max_concurrent_threads: usize,
    /// Time a unit may run once a worker has picked it up. Queued units
    /// that no worker picks up within `unit_timeout * ceil(units / threads)`
    /// are given up.
    pub unit_timeout: Duration,
    /// Log unit failures with their full error chain.
    pub full_logging: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_pages_per_thread: DEFAULT_PAGES_PER_THREAD,
            max_concurrent_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            full_logging: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_pages_per_thread == 0 {
            return Err(PdfError::InvalidConfig(
                "max_pages_per_thread must be positive".into(),
            ));
        }
        if self.max_concurrent_threads == 0 {
            return Err(PdfError::InvalidConfig(
                "max_concurrent_threads must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Extracts the text of one page range from a complete document.
pub trait RangeExtractor: Send + Sync + 'static {
    fn extract(&self, data: Bytes, range: PageRange) -> Result<String>;

    /// Password the extractor opens documents with.
    fn password(&self) -> &str {
        ""
    }
}

/// Parses a fresh document per range and renders it with `TextConverter`.
pub struct PdfRangeExtractor {
    options: ExtractOptions,
    describer: Option<Arc<dyn ImageDescriber>>,
}

impl PdfRangeExtractor {
    /// `options.page_numbers` and `options.maxpages` are replaced per range.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            describer: None,
        }
    }

    pub fn with_describer(mut self, describer: Arc<dyn ImageDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }
}

impl Default for PdfRangeExtractor {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl RangeExtractor for PdfRangeExtractor {
    fn extract(&self, data: Bytes, range: PageRange) -> Result<String> {
        let doc = PDFDocument::new(&data, &self.options.password)?;
        let mut options = self.options.clone().for_range(range.start, range.end);
        options.maxpages = 0;
        extract_text_with_document(&doc, &options, self.describer.clone())
    }

    fn password(&self) -> &str {
        &self.options.password
    }
}

/// Text of a document plus the ranges that did not contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Ranges that timed out or failed, in ascending order.
    pub incomplete_ranges: Vec<PageRange>,
}

impl Extraction {
    pub fn is_partial(&self) -> bool {
        !self.incomplete_ranges.is_empty()
    }
}

enum UnitEvent {
    Started { slot: usize, at: Instant },
    Finished { slot: usize, result: Result<String> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlotState {
    Queued,
    Running { deadline: Instant },
    /// Timed out while its worker is still busy with it.
    Abandoned,
    Done,
    Incomplete,
}

/// Orchestrator-side bookkeeping for one `extract` call.
struct Tracker<'a> {
    ranges: &'a [PageRange],
    slots: Vec<Option<String>>,
    states: Vec<SlotState>,
    /// Slots still owed a result.
    pending: usize,
    /// Workers held by abandoned units of this call.
    stalled: usize,
    /// Queued units that have not started by now are given up.
    start_deadline: Instant,
}

impl<'a> Tracker<'a> {
    fn new(ranges: &'a [PageRange], start_deadline: Instant) -> Self {
        Self {
            ranges,
            slots: vec![None; ranges.len()],
            states: vec![SlotState::Queued; ranges.len()],
            pending: ranges.len(),
            stalled: 0,
            start_deadline,
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.states
            .iter()
            .filter_map(|state| match state {
                SlotState::Running { deadline } => Some(*deadline),
                SlotState::Queued => Some(self.start_deadline),
                _ => None,
            })
            .min()
    }

    fn give_up(&mut self, slot: usize) {
        self.states[slot] = SlotState::Incomplete;
        self.pending -= 1;
    }

    fn expire_running(&mut self, now: Instant, timeout: Duration) {
        for slot in 0..self.states.len() {
            if let SlotState::Running { deadline } = self.states[slot]
                && deadline <= now
            {
                error!(
                    range_start = self.ranges[slot].start,
                    range_end = self.ranges[slot].end,
                    timeout_secs = timeout.as_secs_f64(),
                    "page range timed out"
                );
                self.states[slot] = SlotState::Abandoned;
                self.stalled += 1;
                self.pending -= 1;
            }
        }
    }

    fn expire_queued(&mut self, reason: &'static str) {
        for slot in 0..self.states.len() {
            if self.states[slot] == SlotState::Queued {
                error!(
                    range_start = self.ranges[slot].start,
                    range_end = self.ranges[slot].end,
                    reason,
                    "page range never started"
                );
                self.give_up(slot);
            }
        }
    }

    fn into_extraction(self) -> Extraction {
        let incomplete_ranges = self
            .ranges
            .iter()
            .zip(&self.states)
            .filter(|(_, state)| matches!(state, SlotState::Incomplete | SlotState::Abandoned))
            .map(|(range, _)| *range)
            .collect();
        let text = self
            .slots
            .iter()
            .map(|slot| slot.as_deref().unwrap_or(""))
            .join("\n");
        Extraction {
            text,
            incomplete_ranges,
        }
    }
}

/// A worker pool bound to one range extractor.
///
/// Build once and reuse across documents; `shutdown` releases the workers.
pub struct Pipeline<E: RangeExtractor> {
    config: PipelineConfig,
    extractor: Arc<E>,
    pool: ThreadPool,
}

impl<E: RangeExtractor> Pipeline<E> {
    pub fn new(config: PipelineConfig, extractor: E) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_concurrent_threads)
            .thread_name(|i| format!("quire-worker-{i}"))
            .build()
            .map_err(|e| PdfError::Pool(e.to_string()))?;
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
            pool,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Extract every page of a `page_count`-page document.
    ///
    /// Individual ranges never fail the call; they are reported through
    /// `Extraction::incomplete_ranges` instead. The call returns within
    /// `unit_timeout * ceil(units / max_concurrent_threads)` plus one
    /// `unit_timeout`, even when workers hang.
    pub fn extract(&self, data: Bytes, page_count: usize) -> Extraction {
        let ranges = partition(page_count, self.config.max_pages_per_thread);
        if ranges.is_empty() {
            return Extraction::default();
        }
        debug!(page_count, units = ranges.len(), "submitting page ranges");

        let workers = self.config.max_concurrent_threads;
        let waves = u32::try_from(ranges.len().div_ceil(workers)).unwrap_or(u32::MAX);
        let start_deadline = Instant::now() + self.config.unit_timeout.saturating_mul(waves);

        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        for (slot, &range) in ranges.iter().enumerate() {
            let tx = tx.clone();
            let data = data.clone();
            let extractor = Arc::clone(&self.extractor);
            let cancelled = Arc::clone(&cancelled);
            self.pool.spawn(move || {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                // A closed channel means the caller stopped waiting.
                let _ = tx.send(UnitEvent::Started {
                    slot,
                    at: Instant::now(),
                });
                let result = catch_unwind(AssertUnwindSafe(|| extractor.extract(data, range)))
                    .unwrap_or_else(|panic| {
                        Err(PdfError::Worker {
                            start: range.start,
                            end: range.end,
                            msg: panic_message(panic.as_ref()),
                        })
                    });
                let _ = tx.send(UnitEvent::Finished { slot, result });
            });
        }
        drop(tx);

        let mut tracker = Tracker::new(&ranges, start_deadline);
        while tracker.pending > 0 {
            let event = match tracker.next_deadline() {
                Some(deadline) => {
                    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match event {
                Ok(event) => self.apply(&mut tracker, event),
                Err(RecvTimeoutError::Timeout) => {
                    let now = Instant::now();
                    tracker.expire_running(now, self.config.unit_timeout);
                    if now >= tracker.start_deadline {
                        tracker.expire_queued("start deadline passed");
                    }
                    if tracker.stalled >= workers {
                        // Events already sent may free a worker.
                        while let Ok(event) = rx.try_recv() {
                            self.apply(&mut tracker, event);
                        }
                        if tracker.stalled >= workers {
                            tracker.expire_queued("all workers hung");
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    for slot in 0..tracker.states.len() {
                        if matches!(
                            tracker.states[slot],
                            SlotState::Queued | SlotState::Running { .. }
                        ) {
                            error!(
                                range_start = ranges[slot].start,
                                range_end = ranges[slot].end,
                                "worker went away without a result"
                            );
                            tracker.states[slot] = SlotState::Incomplete;
                        }
                    }
                    tracker.pending = 0;
                }
            }
        }
        cancelled.store(true, Ordering::Release);

        tracker.into_extraction()
    }

    fn apply(&self, tracker: &mut Tracker<'_>, event: UnitEvent) {
        match event {
            UnitEvent::Started { slot, at } => {
                if tracker.states[slot] == SlotState::Queued {
                    tracker.states[slot] = SlotState::Running {
                        deadline: at + self.config.unit_timeout,
                    };
                }
            }
            UnitEvent::Finished { slot, result } => match tracker.states[slot] {
                SlotState::Abandoned => {
                    // Late result; the worker is free again.
                    tracker.states[slot] = SlotState::Incomplete;
                    tracker.stalled -= 1;
                }
                SlotState::Queued | SlotState::Running { .. } => {
                    tracker.pending -= 1;
                    match result {
                        Ok(text) => {
                            tracker.slots[slot] = Some(text);
                            tracker.states[slot] = SlotState::Done;
                        }
                        Err(err) => {
                            self.log_failure(tracker.ranges[slot], &err);
                            tracker.states[slot] = SlotState::Incomplete;
                        }
                    }
                }
                SlotState::Done | SlotState::Incomplete => {}
            },
        }
    }

    fn log_failure(&self, range: PageRange, err: &PdfError) {
        if self.config.full_logging {
            error!(
                range_start = range.start,
                range_end = range.end,
                error = ?err,
                "page range failed"
            );
        } else {
            error!(
                range_start = range.start,
                range_end = range.end,
                error = %err,
                "page range failed"
            );
        }
    }

    /// Stop the workers. Units still running finish in the background.
    pub fn shutdown(self) {
        debug!(
            threads = self.pool.current_num_threads(),
            "shutting down extraction pool"
        );
        drop(self.pool);
    }
}

impl Pipeline<PdfRangeExtractor> {
    /// Pipeline over the production extractor.
    pub fn with_options(config: PipelineConfig, options: ExtractOptions) -> Result<Self> {
        Self::new(config, PdfRangeExtractor::new(options))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}
