//! Main logger implementation

use super::{
    config::LoggerConfig,
    dispatcher::{Dispatcher, SinkSet, SinkSlot},
    error::Result,
    fields::Fields,
    flags::{FieldFlags, OutputMask},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    overflow_policy::{LogPriority, OverflowCallback, OverflowPolicy},
    record::{CallSite, LogRecord, RecordBuilder},
};
use crate::dump::{dump, dump_many, Describable};
use crate::sinks::Sink;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// This timeout is used when the logger is dropped without explicit shutdown.
/// For custom timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Alert on the first dropped record and then every this many
const ALERT_INTERVAL: u64 = 1000;

/// A configured logger
///
/// Records are built on the calling thread. In synchronous mode they are
/// dispatched inline; in async mode they go through a bounded queue drained
/// by a pool of worker threads. With more than one worker the order in which
/// sinks see records is not guaranteed.
///
/// # Example
///
/// ```no_run
/// use sink_logger::{Fields, LogLevel, Logger, LoggerConfig, OutputMask};
///
/// let config = LoggerConfig::default()
///     .with_level(LogLevel::Info)
///     .with_outputs(OutputMask::CONSOLE);
/// let logger = Logger::from_config(config);
///
/// logger.info("user :user signed in", Fields::new().with("user", "ana"));
/// logger.debug("not shown", Fields::new());
/// ```
pub struct Logger {
    level: RwLock<LogLevel>,
    config: LoggerConfig,
    dispatcher: Arc<Dispatcher>,
    sender: Option<Sender<LogRecord>>,
    workers: Vec<JoinHandle<()>>,
    /// Metrics for observability (dropped count, sink failures, etc.)
    metrics: Arc<LoggerMetrics>,
    /// Policy for handling queue overflow
    overflow_policy: OverflowPolicy,
    /// Optional callback for overflow notifications
    on_overflow: Option<OverflowCallback>,
}

impl Logger {
    /// Synchronous logger with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Async logger using the queue and worker settings of `config`
    #[must_use]
    pub fn from_config(config: LoggerConfig) -> Self {
        Self::builder().config(config).asynchronous().build()
    }

    /// Async logger configured from the `LOG_*` environment variables
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_config(LoggerConfig::from_env())
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    /// Whether a record at `level` would be built
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level.read().enables(level)
    }

    pub fn is_async(&self) -> bool {
        self.sender.is_some()
    }

    /// Log at `level`, recording the caller's file and line
    ///
    /// This and the per-level methods never fill `function`, even with
    /// `FieldFlags::FUNCTION` set; the macros (`info!`, `log!`, ...) do.
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str, context: Fields) {
        self.log_at(level, message, context, CallSite::caller());
    }

    /// Log with an explicit call site, as the macros do
    pub fn log_at(&self, level: LogLevel, message: &str, context: Fields, site: CallSite) {
        if !self.enabled(level) {
            return;
        }
        if level != LogLevel::Print && self.config.outputs.is_empty() {
            return;
        }

        let record = RecordBuilder::new(self.config.flags, &self.config.date_format)
            .build(level, message, context, site);
        self.send_record(record);
    }

    #[track_caller]
    #[inline]
    pub fn emergency(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Emergency, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn alert(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Alert, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn critical(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Critical, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Error, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn warning(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Warning, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn notice(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Notice, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Info, message, context, CallSite::caller());
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Debug, message, context, CallSite::caller());
    }

    /// Console-only diagnostic, written even when the level is OFF
    #[track_caller]
    #[inline]
    pub fn print(&self, message: &str, context: Fields) {
        self.log_at(LogLevel::Print, message, context, CallSite::caller());
    }

    /// Write the dump of `value` to stdout, bypassing the sinks
    pub fn dump(&self, value: &dyn Describable) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", dump(value));
    }

    /// Dump several values separated by a dashed line
    pub fn dump_many(&self, values: &[&dyn Describable]) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{}", dump_many(values));
    }

    /// Internal method to send a record with overflow handling
    fn send_record(&self, record: LogRecord) {
        match self.sender {
            Some(ref sender) => match sender.try_send(record) {
                Ok(()) => {
                    // Successfully queued
                }
                Err(TrySendError::Full(record)) => {
                    self.handle_overflow(record);
                }
                Err(TrySendError::Disconnected(record)) => {
                    // Every worker is gone; deliver on this thread instead
                    self.dispatcher.dispatch(&record, self.config.outputs);
                }
            },
            None => self.dispatcher.dispatch(&record, self.config.outputs),
        }
    }

    /// Handle queue overflow based on configured policy and record priority
    fn handle_overflow(&self, record: LogRecord) {
        self.metrics.record_queue_full();

        // Severe records are never dropped - write synchronously
        if record.level.priority() == LogPriority::Critical {
            self.metrics.record_critical_preserved();
            self.dispatcher.dispatch(&record, self.config.outputs);
            return;
        }

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
            }

            OverflowPolicy::Block => {
                self.metrics.record_block();
                if let Some(ref sender) = self.sender {
                    // send() blocks until a worker frees a slot
                    if let Err(e) = sender.send(record) {
                        self.dispatcher.dispatch(&e.0, self.config.outputs);
                    }
                }
            }

            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                if let Some(ref sender) = self.sender {
                    match sender.send_timeout(record, *timeout) {
                        Ok(()) => {}
                        Err(SendTimeoutError::Timeout(_)) => self.alert_and_drop(),
                        Err(SendTimeoutError::Disconnected(record)) => {
                            self.dispatcher.dispatch(&record, self.config.outputs);
                        }
                    }
                }
            }

            OverflowPolicy::AlertAndDrop => self.alert_and_drop(),
        }
    }

    /// Count a dropped record, alerting on the first and every thousandth
    fn alert_and_drop(&self) {
        let total = self.metrics.record_dropped() + 1;

        if total == 1 || total.is_multiple_of(ALERT_INTERVAL) {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} logs dropped. \
                 Consider increasing the queue capacity or using a different overflow policy.",
                total
            );

            if let Some(ref callback) = self.on_overflow {
                callback(total);
            }
        }
    }

    /// Get the number of dropped records
    pub fn dropped_count(&self) -> u64 {
        self.metrics.dropped_count()
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use sink_logger::{Fields, Logger, OutputMask};
    ///
    /// let logger = Logger::builder().outputs(OutputMask::empty()).build();
    /// logger.info("ignored", Fields::new());
    ///
    /// let metrics = logger.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Sink failures: {}", metrics.sink_failures());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every sink
    ///
    /// Records still queued are not waited for; use [`Logger::shutdown`].
    pub fn flush(&self) -> Result<()> {
        self.dispatcher.flush()
    }

    /// Gracefully shutdown the logger with a custom timeout
    ///
    /// Closes the queue, waits for the workers to drain it and flushes the
    /// sinks. Records logged afterwards are dispatched synchronously.
    ///
    /// Returns `true` if every worker finished within `timeout`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sink_logger::{Fields, Logger, LoggerConfig};
    /// use std::time::Duration;
    ///
    /// let mut logger = Logger::from_config(LoggerConfig::default());
    /// logger.info("Important message", Fields::new());
    ///
    /// if !logger.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: Logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let drained = self.stop_workers(timeout);

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }

        drained
    }

    fn stop_workers(&mut self, timeout: Duration) -> bool {
        // Closing the channel lets each worker drain what is left and exit
        drop(self.sender.take());

        let start = Instant::now();
        let mut drained = true;

        for handle in self.workers.drain(..) {
            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!(
                            "[LOGGER ERROR] Dispatch worker panicked during shutdown: {:?}",
                            e
                        );
                        drained = false;
                    }
                    break;
                }

                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Dispatch worker did not finish within {:?} timeout. \
                         Some logs may be lost.",
                        timeout
                    );
                    drained = false;
                    break;
                }

                // Small sleep to avoid busy-waiting
                thread::sleep(Duration::from_millis(10));
            }
        }

        drained
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop_workers(DEFAULT_SHUTDOWN_TIMEOUT);

        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped logs (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

fn spawn_workers(
    count: usize,
    receiver: Receiver<LogRecord>,
    dispatcher: &Arc<Dispatcher>,
    outputs: OutputMask,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(count);

    for index in 0..count {
        let receiver = receiver.clone();
        let dispatcher = Arc::clone(dispatcher);
        let spawned = thread::Builder::new()
            .name(format!("sink-logger-{}", index))
            .spawn(move || {
                // Ends once the sender is dropped and the queue is empty
                for record in receiver.iter() {
                    dispatcher.dispatch(&record, outputs);
                }
            });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => eprintln!("[LOGGER ERROR] Failed to spawn dispatch worker: {}", e),
        }
    }

    handles
}

/// Builder for constructing Logger with a fluent API
///
/// Starts from [`LoggerConfig::default`] in synchronous mode. Sinks given
/// explicitly replace the ones the configuration would create.
///
/// # Example
/// ```
/// use sink_logger::prelude::*;
/// use sink_logger::sinks::{DatabaseSink, MemoryStore};
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Notice)
///     .outputs(OutputMask::DATABASE)
///     .database(DatabaseSink::new(MemoryStore::new()))
///     .async_mode(1000)
///     .workers(4)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} logs dropped", count);
///     }))
///     .build();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sinks: Vec<(SinkSlot, Arc<dyn Sink>)>,
    asynchronous: bool,
    on_overflow: Option<OverflowCallback>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            sinks: Vec::new(),
            asynchronous: false,
            on_overflow: None,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flags(mut self, flags: FieldFlags) -> Self {
        self.config.flags = flags;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn outputs(mut self, outputs: OutputMask) -> Self {
        self.config.outputs = outputs;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, slot: SinkSlot, sink: S) -> Self {
        self.sinks.push((slot, Arc::new(sink)));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console<S: Sink + 'static>(self, sink: S) -> Self {
        self.sink(SinkSlot::Console, sink)
    }

    #[must_use = "builder methods return a new value"]
    pub fn file<S: Sink + 'static>(self, sink: S) -> Self {
        self.sink(SinkSlot::File, sink)
    }

    #[must_use = "builder methods return a new value"]
    pub fn database<S: Sink + 'static>(self, sink: S) -> Self {
        self.sink(SinkSlot::Database, sink)
    }

    #[must_use = "builder methods return a new value"]
    pub fn remote<S: Sink + 'static>(self, sink: S) -> Self {
        self.sink(SinkSlot::Remote, sink)
    }

    /// Enable async mode with the given queue capacity
    ///
    /// If not called, the logger will use synchronous mode.
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(mut self, queue_capacity: usize) -> Self {
        self.config.dispatch.queue_capacity = queue_capacity.max(1);
        self.asynchronous = true;
        self
    }

    /// Enable async mode with the configured queue capacity
    #[must_use = "builder methods return a new value"]
    pub fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }

    /// Number of dispatch workers in async mode
    #[must_use = "builder methods return a new value"]
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.dispatch.workers = workers.max(1);
        self
    }

    /// Set the overflow policy for async logging
    ///
    /// Determines what happens when the queue is full.
    /// Default is `AlertAndDrop`.
    ///
    /// # Example
    ///
    /// ```
    /// use sink_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder()
    ///     .outputs(OutputMask::empty())
    ///     .async_mode(100)
    ///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
    ///     .build();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.dispatch.overflow_policy = policy;
        self
    }

    /// Set a callback for overflow notifications
    ///
    /// The callback is invoked when records are dropped because the queue
    /// is full. The parameter is the total count of dropped records.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Build the logger
    pub fn build(self) -> Logger {
        let config = self.config;

        let mut sinks = SinkSet::from_config(&config).unwrap_or_else(|e| {
            eprintln!("[LOGGER WARNING] {}. Continuing without the remote sink.", e);
            let mut local = config.clone();
            local.outputs.remove(OutputMask::REMOTE);
            SinkSet::from_config(&local).unwrap_or_default()
        });
        for (slot, sink) in self.sinks {
            sinks.set(slot, sink);
        }

        if config.outputs.contains(OutputMask::DATABASE)
            && sinks.get(SinkSlot::Database).is_none()
        {
            eprintln!("[LOGGER WARNING] DATABASE output enabled without a database sink");
        }

        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Arc::new(Dispatcher::new(
            sinks,
            config.flags,
            config.date_format.clone(),
            Arc::clone(&metrics),
        ));

        let (sender, workers) = if self.asynchronous {
            let (sender, receiver) = bounded(config.dispatch.queue_capacity.max(1));
            let workers = spawn_workers(
                config.dispatch.workers.max(1),
                receiver,
                &dispatcher,
                config.outputs,
            );
            if workers.is_empty() {
                eprintln!("[LOGGER WARNING] No dispatch worker started, logging synchronously");
                (None, workers)
            } else {
                (Some(sender), workers)
            }
        } else {
            (None, Vec::new())
        };

        Logger {
            level: RwLock::new(config.level),
            overflow_policy: config.dispatch.overflow_policy.clone(),
            config,
            dispatcher,
            sender,
            workers,
            metrics,
            on_overflow: self.on_overflow,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
