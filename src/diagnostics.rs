/// Receiver of human-readable failure notices.
///
/// A handle calls [`WarningSink::report`] for every failed operation while
/// its diagnostics are enabled. Reports are made once the handle's lock has
/// been released, so a sink may call back into the handle. Implementations
/// must not panic: reporting is a side channel, the error itself is still
/// returned to the caller.
pub trait WarningSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Forwards notices to the `log` facade at warning level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn report(&self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Prints notices to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl WarningSink for StderrSink {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl WarningSink for NullSink {
    fn report(&self, _message: &str) {}
}
