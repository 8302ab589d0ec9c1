//! Notifier that only logs.

use tracing::{debug, info, warn};

use fitmerge_model::Notifier;

/// Sends every event to `tracing` and answers questions with a fixed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    /// Answer every confirmation with yes instead of the question's default.
    pub assume_yes: bool,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assume_yes() -> Self {
        Self { assume_yes: true }
    }
}

impl Notifier for LogNotifier {
    fn message(&self, text: &str) {
        info!("{text}");
    }

    fn success(&self, text: &str) {
        info!(status = "ok", "{text}");
    }

    fn warning(&self, text: &str) {
        warn!("{text}");
    }

    fn error(&self, text: &str) {
        tracing::error!("{text}");
    }

    fn header(&self, text: &str) {
        info!("== {text} ==");
    }

    fn confirm(&self, question: &str, default: bool) -> bool {
        let answer = self.assume_yes || default;
        info!(answer, "{question}");
        answer
    }

    fn progress(&self, current: usize, total: usize, label: &str) {
        debug!(current, total, "{label}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_policy() {
        assert!(!LogNotifier::new().confirm("trim?", false));
        assert!(LogNotifier::new().confirm("continue?", true));
        assert!(LogNotifier::assume_yes().confirm("trim?", false));
    }
}
