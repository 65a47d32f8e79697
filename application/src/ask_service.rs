use crate::error::{AskStep, OrchestrationFailure};
use domain::ask_state::AskState;
use domain::models::GenerationRequest;
use domain::ports::{Generator, Retriever};
use futures::StreamExt;
use shared::telemetry::Telemetry;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    Completed,
    Failed,
}

/// Runs one retrieve-then-generate cycle against a caller-owned `AskState`.
pub struct AskService<R, G> {
    retriever: R,
    generator: G,
    model: String,
}

impl<R, G> AskService<R, G>
where
    R: Retriever,
    G: Generator,
{
    pub fn new(retriever: R, generator: G, model: impl Into<String>) -> Self {
        Self {
            retriever,
            generator,
            model: model.into(),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run one ask. `on_update` sees the state after every visible change.
    /// Failures are logged and leave the state idle; they are never written
    /// into the answer.
    pub async fn ask<F>(&self, state: &mut AskState, mut on_update: F) -> AskOutcome
    where
        F: FnMut(&AskState),
    {
        let telemetry = Telemetry::new();
        state.begin();
        on_update(state);

        let result = self.run(state, &mut on_update).await;

        state.finish();
        on_update(state);

        match result {
            Ok(()) => {
                info!(
                    elapsed_ms = telemetry.elapsed_ms() as u64,
                    answer_len = state.answer.len(),
                    "ask completed"
                );
                AskOutcome::Completed
            }
            Err(failure) => {
                error!(
                    step = %failure.step,
                    elapsed_ms = telemetry.elapsed_ms() as u64,
                    "error during retrieval or generation: {failure}"
                );
                AskOutcome::Failed
            }
        }
    }

    async fn run<F>(&self, state: &mut AskState, on_update: &mut F) -> Result<(), OrchestrationFailure>
    where
        F: FnMut(&AskState),
    {
        let query = state.query.clone();

        let retrieval = self
            .retriever
            .retrieve(&query)
            .await
            .map_err(OrchestrationFailure::at(AskStep::Retrieve))?;
        debug!(
            chunks = retrieval.scored_chunks.len(),
            scores = ?retrieval.scored_chunks.iter().map(|c| c.score).collect::<Vec<_>>(),
            "retrieved chunks"
        );

        state.mark_generating();
        on_update(state);

        let request = GenerationRequest::from_retrieval(&retrieval, query, self.model.clone());
        let mut stream = self
            .generator
            .generate(request)
            .await
            .map_err(OrchestrationFailure::at(AskStep::Generate))?;

        while let Some(item) = stream.next().await {
            let snapshot = item.map_err(OrchestrationFailure::at(AskStep::Stream))?;
            if state.apply_snapshot(&snapshot) {
                on_update(state);
            }
        }
        Ok(())
    }
}
