use crate::ask_status::AskStatus;

/// Display record for the ask form. Owned by the UI layer; only the
/// orchestrator changes `answer` and `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskState {
    pub query: String,
    pub answer: String,
    pub status: AskStatus,
}

impl AskState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn trigger_enabled(&self) -> bool {
        self.status.trigger_enabled()
    }

    /// Enter the retrieving phase and drop the previous answer.
    pub fn begin(&mut self) {
        self.status = AskStatus::Retrieving;
        self.answer.clear();
    }

    pub fn mark_generating(&mut self) {
        self.status = AskStatus::Generating;
    }

    /// Replace the answer with the trimmed snapshot. Empty snapshots are
    /// ignored; returns whether the answer changed.
    pub fn apply_snapshot(&mut self, snapshot: &str) -> bool {
        if snapshot.is_empty() {
            return false;
        }
        let trimmed = snapshot.trim();
        if self.answer == trimmed {
            return false;
        }
        self.answer.clear();
        self.answer.push_str(trimmed);
        true
    }

    pub fn finish(&mut self) {
        self.status = AskStatus::Idle;
    }
}
