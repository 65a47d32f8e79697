use std::fmt;
use thiserror::Error;

/// Step of an ask in which a collaborator failed. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskStep {
    Retrieve,
    Generate,
    Stream,
}

impl fmt::Display for AskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AskStep::Retrieve => "retrieve",
            AskStep::Generate => "generate",
            AskStep::Stream => "stream",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("ask failed during {step}: {source:#}")]
pub struct OrchestrationFailure {
    pub step: AskStep,
    #[source]
    pub source: anyhow::Error,
}

impl OrchestrationFailure {
    pub fn new(step: AskStep, source: anyhow::Error) -> Self {
        Self { step, source }
    }

    pub(crate) fn at(step: AskStep) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::new(step, source)
    }
}
