use crate::models::{GenerationRequest, RetrievalResponse};
use futures::stream::BoxStream;
use shared::types::Result;
use std::future::Future;

/// Live, single-consumer sequence of answer snapshots. Each item is the
/// whole answer generated so far, not a delta.
pub type AnswerStream = BoxStream<'static, Result<String>>;

pub trait Retriever {
    fn retrieve(&self, query: &str) -> impl Future<Output = Result<RetrievalResponse>> + Send;
}

pub trait Generator {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<AnswerStream>> + Send;
}
