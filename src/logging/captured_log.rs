use std::cell::RefCell;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps log records per thread, so tests running in parallel do not see each other's lines.
struct CapturingLogger;

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        RECORDS.with_borrow_mut(|records| {
            records.push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

/// Starts capturing on the current thread, forgetting what was captured before.
pub fn capture() {
    // only the first test to get here installs the logger
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
    RECORDS.with_borrow_mut(Vec::clear);
}

pub fn warnings_containing(text: &str) -> usize {
    RECORDS.with_borrow(|records| {
        records
            .iter()
            .filter(|(level, line)| *level == Level::Warn && line.contains(text))
            .count()
    })
}
