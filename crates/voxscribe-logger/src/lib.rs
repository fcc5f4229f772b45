pub mod severity;
pub mod time;

pub use severity::LogSeverity;

use once_cell::sync::OnceCell;

static MIN_SEVERITY: OnceCell<LogSeverity> = OnceCell::new();

/// Sets the minimum severity once at startup; later calls are ignored.
/// Unset, everything from Info up is printed.
pub fn init(min_severity: LogSeverity) {
    let _ = MIN_SEVERITY.set(min_severity);
}

pub fn log(msg: String, log_severity: LogSeverity) {
    let min = MIN_SEVERITY.get().copied().unwrap_or(LogSeverity::Info);
    if log_severity >= min {
        println!("[{}] {} {}", log_severity, time::now(), msg);
    }
}
