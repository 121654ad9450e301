use chrono::{Local, SecondsFormat};

/// Source of the execution timestamp written in operation mode.
pub trait Clock: Send + Sync {
    /// Current time as RFC 3339 with second precision and a numeric offset.
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}
