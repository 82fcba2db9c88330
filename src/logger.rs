//! The logger capability.
//!
//! Toolkit components report diagnostics through an optional [`Logger`]; without one they stay
//! silent and otherwise behave the same.

use std::sync::Arc;

/// A diagnostics sink.
pub trait Logger: Send + Sync {
    fn info(&self, msg: &str);
    fn debug(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards to the [`log`] facade under the `roost` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl Logger for LogFacade {
    fn info(&self, msg: &str) {
        log::info!(target: "roost", "{}", msg);
    }

    fn debug(&self, msg: &str) {
        log::debug!(target: "roost", "{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!(target: "roost", "{}", msg);
    }
}

/// An optional logger, as held by toolkit components.
#[derive(Clone, Default)]
pub(crate) struct Diagnostics(Option<Arc<dyn Logger>>);

impl Diagnostics {
    pub(crate) fn new(logger: Option<Arc<dyn Logger>>) -> Self {
        Diagnostics(logger)
    }

    #[cfg(test)]
    pub(crate) fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn info(&self, msg: impl FnOnce() -> String) {
        if let Some(logger) = &self.0 {
            logger.info(&msg());
        }
    }

    pub(crate) fn debug(&self, msg: impl FnOnce() -> String) {
        if let Some(logger) = &self.0 {
            logger.debug(&msg());
        }
    }

    pub(crate) fn error(&self, msg: impl FnOnce() -> String) {
        if let Some(logger) = &self.0 {
            logger.error(&msg());
        }
    }
}

impl core::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.0.is_some() {
            write!(f, "Diagnostics(Some(..))")
        } else {
            write!(f, "Diagnostics(None)")
        }
    }
}

/// Collects messages in memory; used by tests throughout the crate.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLogger {
    pub(crate) lines: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingLogger {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

#[cfg(test)]
impl Logger for RecordingLogger {
    fn info(&self, msg: &str) {
        self.lines.lock().push(format!("info: {}", msg));
    }

    fn debug(&self, msg: &str) {
        self.lines.lock().push(format!("debug: {}", msg));
    }

    fn error(&self, msg: &str) {
        self.lines.lock().push(format!("error: {}", msg));
    }
}

#[test]
fn absent_logger_is_silent() {
    let diagnostics = Diagnostics::default();
    assert!(!diagnostics.is_enabled());
    diagnostics.error(|| panic!("message should not be built without a logger"));

    let logger = Arc::new(RecordingLogger::default());
    let diagnostics = Diagnostics::new(Some(logger.clone()));
    diagnostics.info(|| "hello".to_string());
    diagnostics.error(|| "oops".to_string());
    assert_eq!(logger.lines(), vec!["info: hello", "error: oops"]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Records(Mutex<Vec<(Level, String, String)>>);

    impl Log for Records {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            if record.target() == "roost" {
                self.0.lock().push((
                    record.level(),
                    record.target().to_string(),
                    record.args().to_string(),
                ));
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn facade_forwards_to_log() {
        let records: &'static Records = Box::leak(Box::new(Records::default()));
        log::set_logger(records).unwrap();
        log::set_max_level(LevelFilter::Debug);

        let facade: Arc<dyn Logger> = Arc::new(LogFacade);
        let diagnostics = Diagnostics::new(Some(facade));
        diagnostics.info(|| "window opened".to_string());
        diagnostics.debug(|| "focus gained".to_string());
        diagnostics.error(|| "surface lost".to_string());

        let roost = "roost".to_string();
        assert_eq!(
            *records.0.lock(),
            vec![
                (Level::Info, roost.clone(), "window opened".to_string()),
                (Level::Debug, roost.clone(), "focus gained".to_string()),
                (Level::Error, roost, "surface lost".to_string()),
            ]
        );
    }
}
