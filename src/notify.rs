//! Blocking user notifications.
//!
//! Anything the operator must acknowledge (validation warnings, registry
//! confirmations and errors) goes through a [`Notifier`]. The terminal
//! implementation prints to stderr; tests record what would have been shown.

use std::io::Write;

pub trait Notifier {
    fn alert(&mut self, message: &str);
}

/// Prints each alert to stderr, one block per alert.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn alert(&mut self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        for line in message.lines() {
            // Nothing useful to do if stderr itself is gone.
            let _ = writeln!(stderr, "! {line}");
        }
    }
}

/// Keeps every alert in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    alerts: Vec<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn last(&self) -> Option<&str> {
        self.alerts.last().map(String::as_str)
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&mut self, message: &str) {
        tracing::debug!(message, "Alert recorded");
        self.alerts.push(message.to_string());
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn alert(&mut self, message: &str) {
        (**self).alert(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let mut notifier = RecordingNotifier::new();
        notifier.alert("first");
        notifier.alert("second");
        assert_eq!(notifier.alerts(), ["first", "second"]);
        assert_eq!(notifier.last(), Some("second"));
    }

    #[test]
    fn mutable_reference_forwards() {
        fn warn(mut n: impl Notifier) {
            n.alert("via reference");
        }
        let mut notifier = RecordingNotifier::new();
        warn(&mut notifier);
        assert_eq!(notifier.last(), Some("via reference"));
    }
}
