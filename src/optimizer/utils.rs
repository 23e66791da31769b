/// Utility functions for the engine
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation flag shared between an engine and its callers.
///
/// Cloning shares the flag. The engine polls it once per completed step.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    flag: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a pending request so the engine can be run again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Format a duration as a short human-readable string ("850ms", "2m 30s", "1h 15m")
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let secs_remaining = secs % 60.0;
        format!("{}m {:.0}s", mins, secs_remaining)
    } else {
        let hours = (secs / 3600.0).floor();
        let mins_remaining = ((secs % 3600.0) / 60.0).floor();
        format!("{}h {}m", hours, mins_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Duration::from_millis(850), "850ms")]
    #[test_case(Duration::from_millis(2500), "2.5s")]
    #[test_case(Duration::from_secs(150), "2m 30s")]
    #[test_case(Duration::from_secs(4500), "1h 15m")]
    fn test_format_duration(duration: Duration, expected: &str) {
        assert_eq!(format_duration(duration), expected);
    }

    #[test]
    fn test_interrupt_is_shared_between_clones() {
        let handle = InterruptHandle::new();
        let other = handle.clone();
        assert!(!handle.is_interrupted());

        other.interrupt();
        assert!(handle.is_interrupted());

        handle.reset();
        assert!(!other.is_interrupted());
    }
}
