//! Notification sink.
//!
//! The validator, merge engine and pipeline report every user-relevant event
//! through a [`Notifier`]. Confirmation requests (head trim, continuing past
//! validation findings, overwriting an output) go through [`Notifier::confirm`].

use std::collections::VecDeque;
use std::sync::Mutex;

/// Kind of a recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Header,
    Message,
    Success,
    Warning,
    Error,
    Question,
    Progress,
}

/// Receives user-facing events.
pub trait Notifier: Send + Sync {
    fn message(&self, text: &str);
    fn success(&self, text: &str);
    fn warning(&self, text: &str);
    fn error(&self, text: &str);
    /// Start of a new section.
    fn header(&self, text: &str);
    /// Yes/no question. `default` is the answer used when no answer is available.
    fn confirm(&self, question: &str, default: bool) -> bool;
    fn progress(&self, current: usize, total: usize, label: &str);
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Notifier that stores every event and answers questions from a script.
///
/// Questions beyond the scripted answers get their default.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    answers: Mutex<VecDeque<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue answers for upcoming questions, in order.
    #[must_use]
    pub fn with_answers(self, answers: impl IntoIterator<Item = bool>) -> Self {
        if let Ok(mut queue) = self.answers.lock() {
            queue.extend(answers);
        }
        self
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    /// Texts recorded at the given level.
    pub fn texts(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.level == level)
            .map(|notice| notice.text)
            .collect()
    }

    fn record(&self, level: NoticeLevel, text: impl Into<String>) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                level,
                text: text.into(),
            });
        }
    }
}

impl Notifier for RecordingNotifier {
    fn message(&self, text: &str) {
        self.record(NoticeLevel::Message, text);
    }

    fn success(&self, text: &str) {
        self.record(NoticeLevel::Success, text);
    }

    fn warning(&self, text: &str) {
        self.record(NoticeLevel::Warning, text);
    }

    fn error(&self, text: &str) {
        self.record(NoticeLevel::Error, text);
    }

    fn header(&self, text: &str) {
        self.record(NoticeLevel::Header, text);
    }

    fn confirm(&self, question: &str, default: bool) -> bool {
        self.record(NoticeLevel::Question, question);
        self.answers
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(default)
    }

    fn progress(&self, current: usize, total: usize, label: &str) {
        self.record(NoticeLevel::Progress, format!("{current}/{total} {label}"));
    }
}
