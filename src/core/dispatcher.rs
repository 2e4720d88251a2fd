//! Fan-out of built records to the configured sinks
//!
//! Every sink call is isolated with `catch_unwind`: a sink that errors or
//! panics is reported on the console and the remaining sinks still run.

use super::config::LoggerConfig;
use super::error::{LoggerError, Result};
use super::fields::Fields;
use super::flags::{FieldFlags, OutputMask};
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::record::{CallSite, LogRecord, RecordBuilder};
use super::timestamp::TimestampFormat;
use crate::formatters::FormatOptions;
use crate::sinks::{ConsoleSink, FileSink, Sink};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Message of the PRINT record emitted when a sink fails
const FAILURE_TEMPLATE: &str = "Failed to write log to :sink: :error";

/// Position of a sink in the dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkSlot {
    Console,
    File,
    Database,
    Remote,
}

impl SinkSlot {
    /// Dispatch order
    pub const ALL: [SinkSlot; 4] = [
        SinkSlot::Console,
        SinkSlot::File,
        SinkSlot::Database,
        SinkSlot::Remote,
    ];

    /// Output bit that enables this slot
    pub fn output(self) -> OutputMask {
        match self {
            SinkSlot::Console => OutputMask::CONSOLE,
            SinkSlot::File => OutputMask::FILE,
            SinkSlot::Database => OutputMask::DATABASE,
            SinkSlot::Remote => OutputMask::REMOTE,
        }
    }
}

/// One optional sink per slot
#[derive(Clone, Default)]
pub struct SinkSet {
    console: Option<Arc<dyn Sink>>,
    file: Option<Arc<dyn Sink>>,
    database: Option<Arc<dyn Sink>>,
    remote: Option<Arc<dyn Sink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console and file sinks from `config`, plus the remote sink when the
    /// REMOTE output is enabled. The database slot needs a store and is
    /// always left empty.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let mut set = Self::new();

        set.set(SinkSlot::Console, Arc::new(ConsoleSink::new(config.flags)));

        let options =
            FormatOptions::new(config.flags).with_csv_delimiter(config.file.csv_delimiter);
        let file = FileSink::new(&config.file.dir)
            .with_channel(config.file.channel)
            .with_retention_days(config.file.retention_days)
            .with_format(config.file.format, options);
        set.set(SinkSlot::File, Arc::new(file));

        #[cfg(feature = "remote")]
        {
            if config.outputs.contains(OutputMask::REMOTE) {
                let remote = crate::sinks::RemoteSink::new(&config.remote)?;
                set.set(SinkSlot::Remote, Arc::new(remote));
            }
        }

        Ok(set)
    }

    #[must_use]
    pub fn with(mut self, slot: SinkSlot, sink: Arc<dyn Sink>) -> Self {
        self.set(slot, sink);
        self
    }

    pub fn set(&mut self, slot: SinkSlot, sink: Arc<dyn Sink>) {
        *self.slot_mut(slot) = Some(sink);
    }

    pub fn clear(&mut self, slot: SinkSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn get(&self, slot: SinkSlot) -> Option<&Arc<dyn Sink>> {
        match slot {
            SinkSlot::Console => self.console.as_ref(),
            SinkSlot::File => self.file.as_ref(),
            SinkSlot::Database => self.database.as_ref(),
            SinkSlot::Remote => self.remote.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        SinkSlot::ALL.iter().all(|slot| self.get(*slot).is_none())
    }

    fn slot_mut(&mut self, slot: SinkSlot) -> &mut Option<Arc<dyn Sink>> {
        match slot {
            SinkSlot::Console => &mut self.console,
            SinkSlot::File => &mut self.file,
            SinkSlot::Database => &mut self.database,
            SinkSlot::Remote => &mut self.remote,
        }
    }
}

impl fmt::Debug for SinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in SinkSlot::ALL {
            if let Some(sink) = self.get(slot) {
                list.entry(&format_args!("{:?}({})", slot, sink.name()));
            }
        }
        list.finish()
    }
}

/// Delivers records to a [`SinkSet`]
///
/// Shared by every dispatch worker.
pub struct Dispatcher {
    sinks: SinkSet,
    flags: FieldFlags,
    timestamp: TimestampFormat,
    metrics: Arc<LoggerMetrics>,
}

impl Dispatcher {
    /// `flags` and `timestamp` shape the failure reports
    pub fn new(
        sinks: SinkSet,
        flags: FieldFlags,
        timestamp: TimestampFormat,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sinks,
            flags,
            timestamp,
            metrics,
        }
    }

    pub fn sinks(&self) -> &SinkSet {
        &self.sinks
    }

    /// Hand `record` to every slot enabled in `mask`, in slot order.
    ///
    /// PRINT records go to the console slot only, whatever the mask.
    pub fn dispatch(&self, record: &LogRecord, mask: OutputMask) {
        if record.level == LogLevel::Print {
            if let Some(console) = self.sinks.get(SinkSlot::Console) {
                self.deliver(SinkSlot::Console, console.as_ref(), record);
            }
            self.metrics.record_dispatched();
            return;
        }

        for slot in SinkSlot::ALL {
            if !mask.contains(slot.output()) {
                continue;
            }
            if let Some(sink) = self.sinks.get(slot) {
                self.deliver(slot, sink.as_ref(), record);
            }
        }
        self.metrics.record_dispatched();
    }

    /// Flush every sink, returning the first failure
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for slot in SinkSlot::ALL {
            let Some(sink) = self.sinks.get(slot) else {
                continue;
            };
            if let Err(e) = isolate(sink.name(), || sink.flush()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn deliver(&self, slot: SinkSlot, sink: &dyn Sink, record: &LogRecord) {
        if let Err(e) = isolate(sink.name(), || sink.write(record)) {
            self.report(slot, sink.name(), &e);
        }
    }

    /// Turn a sink failure into a PRINT record on the console slot
    fn report(&self, failed: SinkSlot, name: &str, error: &LoggerError) {
        self.metrics.record_sink_failure();

        let console = match self.sinks.get(SinkSlot::Console) {
            Some(console) if failed != SinkSlot::Console => console,
            _ => {
                eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", name, error);
                return;
            }
        };

        let context = Fields::new()
            .with("sink", name)
            .with("error", error.to_string());
        let site = CallSite::new(file!(), line!(), Some(module_path!()));
        let report = RecordBuilder::new(self.flags, &self.timestamp).build(
            LogLevel::Print,
            FAILURE_TEMPLATE,
            context,
            site,
        );

        if let Err(e) = isolate(console.name(), || console.write(&report)) {
            eprintln!(
                "[LOGGER ERROR] Failed to report '{}' sink failure ({}): {}",
                name, error, e
            );
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sinks", &self.sinks)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Run one sink call, converting a panic into [`LoggerError::SinkPanicked`]
fn isolate<F>(name: &str, call: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::sink_panicked(name, panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recording {
        name: &'static str,
        records: Mutex<Vec<LogRecord>>,
    }

    impl Recording {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                records: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.records.lock().iter().map(|r| r.message.clone()).collect()
        }
    }

    impl Sink for Recording {
        fn write(&self, record: &LogRecord) -> Result<()> {
            self.records.lock().push(record.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct Failing;

    impl Sink for Failing {
        fn write(&self, _record: &LogRecord) -> Result<()> {
            Err(LoggerError::other("disk full"))
        }

        fn name(&self) -> &str {
            "file"
        }
    }

    struct Panicking;

    impl Sink for Panicking {
        fn write(&self, _record: &LogRecord) -> Result<()> {
            panic!("store exploded");
        }

        fn name(&self) -> &str {
            "database"
        }
    }

    fn dispatcher(sinks: SinkSet) -> (Dispatcher, Arc<LoggerMetrics>) {
        let metrics = Arc::new(LoggerMetrics::new());
        let dispatcher = Dispatcher::new(
            sinks,
            FieldFlags::empty(),
            TimestampFormat::default(),
            Arc::clone(&metrics),
        );
        (dispatcher, metrics)
    }

    #[test]
    fn test_mask_selects_slots() {
        let console = Recording::named("console");
        let remote = Recording::named("remote");
        let sinks = SinkSet::new()
            .with(SinkSlot::Console, console.clone())
            .with(SinkSlot::Remote, remote.clone());
        let (dispatcher, metrics) = dispatcher(sinks);

        dispatcher.dispatch(&LogRecord::new(LogLevel::Info, "both"), OutputMask::ALL);
        dispatcher.dispatch(&LogRecord::new(LogLevel::Info, "remote only"), OutputMask::REMOTE);

        assert_eq!(console.messages(), vec!["both"]);
        assert_eq!(remote.messages(), vec!["both", "remote only"]);
        assert_eq!(metrics.dispatched(), 2);
    }

    #[test]
    fn test_print_goes_to_console_only() {
        let console = Recording::named("console");
        let file = Recording::named("file");
        let sinks = SinkSet::new()
            .with(SinkSlot::Console, console.clone())
            .with(SinkSlot::File, file.clone());
        let (dispatcher, _) = dispatcher(sinks);

        dispatcher.dispatch(&LogRecord::new(LogLevel::Print, "diag"), OutputMask::FILE);

        assert_eq!(console.messages(), vec!["diag"]);
        assert!(file.messages().is_empty());
    }

    #[test]
    fn test_failures_are_reported_on_console() {
        let console = Recording::named("console");
        let remote = Recording::named("remote");
        let sinks = SinkSet::new()
            .with(SinkSlot::Console, console.clone())
            .with(SinkSlot::File, Arc::new(Failing))
            .with(SinkSlot::Database, Arc::new(Panicking))
            .with(SinkSlot::Remote, remote.clone());
        let (dispatcher, metrics) = dispatcher(sinks);

        dispatcher.dispatch(&LogRecord::new(LogLevel::Error, "boom"), OutputMask::ALL);

        assert_eq!(remote.messages(), vec!["boom"]);
        let records = console.records.lock();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].message, "boom");
        assert_eq!(records[1].level, LogLevel::Print);
        assert_eq!(records[1].message, "Failed to write log to file: disk full");
        assert_eq!(
            records[2].message,
            "Failed to write log to database: Sink 'database' panicked: store exploded"
        );
        assert_eq!(metrics.sink_failures(), 2);
    }

    #[test]
    fn test_failure_without_console_is_counted() {
        let sinks = SinkSet::new().with(SinkSlot::File, Arc::new(Failing));
        let (dispatcher, metrics) = dispatcher(sinks);

        dispatcher.dispatch(&LogRecord::new(LogLevel::Info, "x"), OutputMask::ALL);
        assert_eq!(metrics.sink_failures(), 1);
    }

    #[test]
    fn test_from_config_fills_console_and_file() {
        let config = LoggerConfig::default();
        let sinks = SinkSet::from_config(&config).unwrap();
        assert!(sinks.get(SinkSlot::Console).is_some());
        assert!(sinks.get(SinkSlot::File).is_some());
        assert!(sinks.get(SinkSlot::Database).is_none());
        assert!(sinks.get(SinkSlot::Remote).is_none());
    }
}
