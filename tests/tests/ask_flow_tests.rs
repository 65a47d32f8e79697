use application::ask_service::{AskOutcome, AskService};
use domain::ask_state::AskState;
use domain::ask_status::AskStatus;
use domain::models::RetrievalResponse;
use domain::ports::Retriever;
use shared::types::Result;
use std::sync::{Arc, Mutex};
use tests::{chunk, CallLog, ScriptedGenerator, ScriptedRetriever};
use tokio::sync::Notify;

fn service(
    retriever: ScriptedRetriever,
    generator: ScriptedGenerator,
) -> AskService<ScriptedRetriever, ScriptedGenerator> {
    AskService::new(retriever, generator, "gpt-4o")
}

#[tokio::test]
async fn ask_clears_answer_and_shows_retrieving_before_any_call() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9)], log.clone()),
        ScriptedGenerator::snapshots(&["fresh"], log.clone()),
    );
    let mut state = AskState::with_query("Q");
    state.answer = "stale answer".into();

    let mut first_update = None;
    service
        .ask(&mut state, |s| {
            if first_update.is_none() {
                first_update = Some((s.status, s.answer.clone(), log.len()));
            }
        })
        .await;

    let (status, answer, calls_so_far) = first_update.unwrap();
    assert_eq!(status, AskStatus::Retrieving);
    assert!(answer.is_empty());
    assert_eq!(calls_so_far, 0);
    assert_eq!(state.answer, "fresh");
}

/// Retriever that blocks until released, to observe the form mid-call.
struct GatedRetriever {
    gate: Arc<Notify>,
}

impl Retriever for GatedRetriever {
    async fn retrieve(&self, _query: &str) -> Result<RetrievalResponse> {
        self.gate.notified().await;
        Ok(RetrievalResponse::new(vec![chunk("A", 0.9)]))
    }
}

#[tokio::test]
async fn form_is_busy_while_retrieval_is_pending() {
    let gate = Arc::new(Notify::new());
    let service = AskService::new(
        GatedRetriever { gate: gate.clone() },
        ScriptedGenerator::snapshots(&["answer"], CallLog::default()),
        "gpt-4o",
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut state = AskState::with_query("Q");
    state.answer = "old".into();

    let recorder = seen.clone();
    let ask = service.ask(&mut state, move |s| {
        recorder.lock().unwrap().push((s.status, s.answer.clone()))
    });
    let observe = async {
        tokio::task::yield_now().await;
        let snapshot = seen.lock().unwrap().clone();
        gate.notify_one();
        snapshot
    };
    let (outcome, mid_call) = tokio::join!(ask, observe);

    assert_eq!(outcome, AskOutcome::Completed);
    assert_eq!(mid_call, vec![(AskStatus::Retrieving, String::new())]);
    assert_eq!(state.answer, "answer");
}

#[tokio::test]
async fn failed_retrieval_returns_to_idle_without_generating() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::failing(log.clone()),
        ScriptedGenerator::snapshots(&["never shown"], log.clone()),
    );
    let mut state = AskState::with_query("Q");

    let outcome = service.ask(&mut state, |_| {}).await;

    assert_eq!(outcome, AskOutcome::Failed);
    assert_eq!(state.status, AskStatus::Idle);
    assert!(state.answer.is_empty());
    assert_eq!(log.events(), vec!["retrieve:Q"]);
    assert!(service.generator().requests().is_empty());
}

#[tokio::test]
async fn failed_generation_start_idles_with_empty_answer() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9)], log.clone()),
        ScriptedGenerator::failing(log.clone()),
    );
    let mut state = AskState::with_query("Q");
    state.answer = "previous answer".into();
    let mut statuses = Vec::new();

    let outcome = service.ask(&mut state, |s| statuses.push(s.status)).await;

    assert_eq!(outcome, AskOutcome::Failed);
    assert_eq!(state.status, AskStatus::Idle);
    assert!(state.answer.is_empty());
    assert_eq!(log.events(), vec!["retrieve:Q", "generate:Q"]);
    assert_eq!(
        statuses,
        vec![AskStatus::Retrieving, AskStatus::Generating, AskStatus::Idle]
    );
}

#[tokio::test]
async fn displayed_answer_is_last_snapshot_not_concatenation() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9), chunk("B", 0.5)], log.clone()),
        ScriptedGenerator::snapshots(&["Partial one", "Partial one and two"], log.clone()),
    );
    let mut state = AskState::with_query("Q");
    let mut answers = Vec::new();

    let outcome = service
        .ask(&mut state, |s| answers.push(s.answer.clone()))
        .await;

    assert_eq!(outcome, AskOutcome::Completed);
    assert_eq!(state.answer, "Partial one and two");
    assert!(answers.contains(&"Partial one".to_string()));

    let requests = service.generator().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].context, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(requests[0].query, "Q");
    assert_eq!(requests[0].model, "gpt-4o");
}

#[tokio::test]
async fn snapshots_are_trimmed_and_empty_ones_skipped() {
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9)], CallLog::default()),
        ScriptedGenerator::snapshots(&["  Hello", "", "  Hello world \n"], CallLog::default()),
    );
    let mut state = AskState::with_query("Q");
    let mut answers = Vec::new();

    service
        .ask(&mut state, |s| {
            if s.status == AskStatus::Generating && !s.answer.is_empty() {
                answers.push(s.answer.clone());
            }
        })
        .await;

    assert_eq!(answers, vec!["Hello", "Hello world"]);
}

#[tokio::test]
async fn trigger_is_reenabled_exactly_once() {
    for retriever_ok in [true, false] {
        let log = CallLog::default();
        let retriever = if retriever_ok {
            ScriptedRetriever::ok(vec![chunk("A", 0.9)], log.clone())
        } else {
            ScriptedRetriever::failing(log.clone())
        };
        let service = service(
            retriever,
            ScriptedGenerator::snapshots(&["one", "one two"], log.clone()),
        );
        let mut state = AskState::with_query("Q");
        let mut enabled = Vec::new();

        service
            .ask(&mut state, |s| enabled.push(s.trigger_enabled()))
            .await;

        assert_eq!(enabled.last(), Some(&true));
        assert_eq!(enabled.iter().filter(|e| **e).count(), 1);
    }
}

#[tokio::test]
async fn mid_stream_failure_keeps_partial_answer_and_idles() {
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9)], CallLog::default()),
        ScriptedGenerator::script(
            vec![Ok("Partial".into()), Err("connection reset".into())],
            CallLog::default(),
        ),
    );
    let mut state = AskState::with_query("Q");

    let outcome = service.ask(&mut state, |_| {}).await;

    assert_eq!(outcome, AskOutcome::Failed);
    assert_eq!(state.answer, "Partial");
    assert_eq!(state.status, AskStatus::Idle);
}

#[tokio::test]
async fn empty_query_runs_the_full_sequence() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::ok(Vec::new(), log.clone()),
        ScriptedGenerator::snapshots(&["I don't know."], log.clone()),
    );
    let mut state = AskState::new();

    let outcome = service.ask(&mut state, |_| {}).await;

    assert_eq!(outcome, AskOutcome::Completed);
    assert_eq!(log.events(), vec!["retrieve:", "generate:"]);
    assert!(service.generator().requests()[0].context.is_empty());
    assert_eq!(state.answer, "I don't know.");
}

#[tokio::test]
async fn sequential_asks_never_interleave() {
    let log = CallLog::default();
    let service = service(
        ScriptedRetriever::ok(vec![chunk("A", 0.9)], log.clone()),
        ScriptedGenerator::snapshots(&["answer"], log.clone()),
    );
    let mut state = AskState::new();

    for query in ["first", "second"] {
        state.set_query(query);
        let ui_log = log.clone();
        service
            .ask(&mut state, move |s| {
                if s.trigger_enabled() {
                    ui_log.push(format!("idle:{}", s.query));
                }
            })
            .await;
    }

    assert_eq!(
        log.events(),
        vec![
            "retrieve:first",
            "generate:first",
            "idle:first",
            "retrieve:second",
            "generate:second",
            "idle:second",
        ]
    );
}
