use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AskStatus {
    #[default]
    Idle,
    Retrieving,
    Generating,
}

impl AskStatus {
    /// Text shown on the trigger control.
    pub fn label(self) -> &'static str {
        match self {
            AskStatus::Idle => "Ask Question",
            AskStatus::Retrieving => "Retrieving...",
            AskStatus::Generating => "Generating...",
        }
    }

    pub fn is_busy(self) -> bool {
        !matches!(self, AskStatus::Idle)
    }

    pub fn trigger_enabled(self) -> bool {
        !self.is_busy()
    }
}

impl fmt::Display for AskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
