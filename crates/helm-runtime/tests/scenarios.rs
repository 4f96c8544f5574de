//! End-to-end orchestration passes against scripted models and in-memory or
//! file-backed stores.

#![allow(missing_docs, unused_results)]

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;

use helm_context::{FileContextStore, MemoryContextStore};
use helm_core::constants::{CHUNK_SUMMARY_MARKER, PLAN_BLOCK_HEADER};
use helm_core::ids::SessionId;
use helm_core::messages::Message;
use helm_core::plan::{Plan, PlanStep, StepStatus};
use helm_core::state::StateEntry;
use helm_llm::scripted::ScriptedModel;
use helm_planning::injector::{FINAL_ANSWER_NOTE, KEEP_WORKING_NOTE};
use helm_planning::{FilePlanStore, MemoryPlanStore, PlanStore};
use helm_runtime::{
    DecisionRecord, OrchestrationRequest, Orchestrator, OrchestratorConfig,
    PLANNING_DISABLED_NOTICE,
};

const FRESH_PLAN: &str = r#"{"steps":[{"step_number":"1","description":"Fetch data","status":"NOT_STARTED","coworker":"SQL Agent"}],"next_step":"1"}"#;

struct Harness {
    model: Arc<ScriptedModel>,
    plans: Arc<MemoryPlanStore>,
    context: Arc<MemoryContextStore>,
    orchestrator: Orchestrator,
}

fn harness(model: ScriptedModel, config: OrchestratorConfig) -> Harness {
    let model = Arc::new(model);
    let plans = Arc::new(MemoryPlanStore::new());
    let context = Arc::new(MemoryContextStore::new());
    let orchestrator = Orchestrator::new(model.clone(), plans.clone(), context.clone(), config);
    Harness {
        model,
        plans,
        context,
        orchestrator,
    }
}

fn session() -> SessionId {
    SessionId::from("session-1")
}

fn request(messages: Vec<Message>) -> OrchestrationRequest {
    OrchestrationRequest::new(session(), "agent-1", messages)
}

fn step(n: &str, desc: &str, status: StepStatus, coworker: &str) -> PlanStep {
    PlanStep::new(n, desc, status, coworker)
}

fn plan_json(plan: &Plan) -> String {
    serde_json::to_string(plan).unwrap()
}

fn count_containing(messages: &[Message], needle: &str) -> usize {
    messages.iter().filter(|m| m.content.contains(needle)).count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario A: fresh single-step plan, no new evidence
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_step_plan_without_evidence_keeps_working_on_step_one() {
    let plan = Plan::new(vec![step("1", "Fetch data", StepStatus::NotStarted, "SQL Agent")], "1");
    let h = harness(ScriptedModel::with_texts([plan_json(&plan)]), OrchestratorConfig::default());
    h.plans.write(&session(), &plan).unwrap();

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Show sales")])).await;

    assert!(prepared.outcome.plan_evaluated);
    assert!(!prepared.outcome.plan_created);
    assert_eq!(prepared.outcome.decision, DecisionRecord::Skipped);
    assert_eq!(prepared.outcome.next_step.as_deref(), Some("1"));
    assert_eq!(prepared.outcome.status_note.as_deref(), Some("keep_working"));

    let last = prepared.messages.last().unwrap();
    assert!(last.is_user());
    assert!(last.content.starts_with(PLAN_BLOCK_HEADER));
    assert!(last.content.contains("Focus: Fetch data"));
    assert!(last.content.ends_with(KEEP_WORKING_NOTE));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario B: completed step stays locked, selector moves to step two
// ─────────────────────────────────────────────────────────────────────────────

fn two_step_plan() -> Plan {
    Plan::new(
        vec![
            step("1", "Fetch data", StepStatus::Completed, "SQL Agent"),
            step("2", "Draw chart", StepStatus::NotStarted, "Viz Agent"),
        ],
        "2",
    )
}

#[tokio::test]
async fn completed_step_is_carried_over_and_next_is_two() {
    let plan = two_step_plan();
    let h = harness(ScriptedModel::with_texts([plan_json(&plan)]), OrchestratorConfig::default());
    h.plans.write(&session(), &plan).unwrap();

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    let stored = h.plans.read(&session()).unwrap().unwrap();
    assert_eq!(stored.steps[0], plan.steps[0]);
    assert_eq!(stored.next_step, "2");
    assert_eq!(prepared.outcome.next_step.as_deref(), Some("2"));
}

#[tokio::test]
async fn evaluation_that_reopens_a_locked_step_is_rejected() {
    let plan = two_step_plan();
    let mut tampered = plan.clone();
    tampered.steps[0].status = StepStatus::InProgress;
    tampered.steps[0].description = "Fetch more data".into();
    let h = harness(
        ScriptedModel::with_texts([plan_json(&tampered)]),
        OrchestratorConfig::default(),
    );
    h.plans.write(&session(), &plan).unwrap();

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    assert!(!prepared.outcome.plan_evaluated);
    assert_eq!(h.plans.read(&session()).unwrap(), Some(plan));
    assert_eq!(prepared.outcome.next_step.as_deref(), Some("2"));
}

#[tokio::test]
async fn unparsable_evaluation_keeps_prior_plan() {
    let plan = two_step_plan();
    let h = harness(
        ScriptedModel::with_texts(["Looks good to me!"]),
        OrchestratorConfig::default(),
    );
    h.plans.write(&session(), &plan).unwrap();

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    assert!(!prepared.outcome.plan_evaluated);
    assert_eq!(h.plans.read(&session()).unwrap(), Some(plan));
    assert_eq!(h.model.call_count(), 1);
}

#[tokio::test]
async fn new_evidence_reaches_the_evaluator() {
    let plan = two_step_plan();
    let mut progressed = plan.clone();
    progressed.steps[1].status = StepStatus::Completed;
    let h = harness(
        ScriptedModel::with_texts([plan_json(&progressed)]),
        OrchestratorConfig::default(),
    );
    h.plans.write(&session(), &plan).unwrap();
    h.context.append(&session(), StateEntry::new("Chart sales please").conversation());
    h.context.append(
        &session(),
        StateEntry::new("chart.png written")
            .with_agent_role("Viz Agent")
            .with_task("Draw chart"),
    );

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    let eval_call = &h.model.calls()[0];
    assert_eq!(count_containing(eval_call, "chart.png written"), 1);
    assert_eq!(prepared.outcome.status_note.as_deref(), Some("final_answer"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario C: all completed
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn all_completed_injects_only_the_final_answer_note() {
    let plan = two_step_plan();
    let mut done = plan.clone();
    done.steps[1].status = StepStatus::Completed;
    let h = harness(ScriptedModel::with_texts([plan_json(&done)]), OrchestratorConfig::default());
    h.plans.write(&session(), &plan).unwrap();

    // last turn's keep-working note is still in the history
    let history = vec![
        Message::user("Chart sales"),
        Message::assistant("Working on the chart."),
        Message::user(KEEP_WORKING_NOTE),
    ];
    let prepared = h.orchestrator.prepare(request(history)).await;

    assert_eq!(count_containing(&prepared.messages, FINAL_ANSWER_NOTE), 1);
    assert_eq!(count_containing(&prepared.messages, KEEP_WORKING_NOTE), 0);
    assert_eq!(prepared.outcome.next_step.as_deref(), Some(""));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario D: planner exhausts its attempts
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_bad_plans_disable_planning_for_the_session() {
    let model = ScriptedModel::with_texts([
        r#"{"needs_planning": true}"#,
        "Sure, here is my plan: first fetch, then chart.",
        "{\"steps\": \"fetch, chart\"}",
        "I really cannot produce JSON.",
        FRESH_PLAN,
    ]);
    let h = harness(model, OrchestratorConfig::default());

    let first = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    assert_eq!(h.model.call_count(), 4);
    assert!(h.orchestrator.sessions().is_planning_disabled(&session()));
    assert_eq!(first.outcome.notices, vec![PLANNING_DISABLED_NOTICE.to_owned()]);
    assert_eq!(count_containing(&first.messages, PLANNING_DISABLED_NOTICE), 1);
    assert!(!first.outcome.plan_created);
    assert!(h.plans.read(&session()).unwrap().is_none());

    let second = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    assert_eq!(h.model.call_count(), 4, "the well-formed reply must never be requested");
    assert!(second.outcome.notices.is_empty());
    assert_eq!(count_containing(&second.messages, PLANNING_DISABLED_NOTICE), 0);
    assert_eq!(second.outcome.decision, DecisionRecord::Skipped);
}

#[tokio::test]
async fn planner_model_error_does_not_disable_planning() {
    let model = ScriptedModel::new();
    model.push_text(r#"{"needs_planning": true}"#);
    model.push_error("timeout");
    let h = harness(model, OrchestratorConfig::default());

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Chart sales")])).await;

    assert!(!h.orchestrator.sessions().is_planning_disabled(&session()));
    assert!(prepared.outcome.notices.is_empty());
    assert_eq!(prepared.messages, vec![Message::user("Chart sales")]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario E: direct answer short-circuits planning
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn direct_answer_skips_planner_and_evaluator() {
    let h = harness(
        ScriptedModel::with_texts([r#"{"result": "42"}"#, FRESH_PLAN]),
        OrchestratorConfig::default(),
    );

    let prepared = h
        .orchestrator
        .prepare(request(vec![Message::user(
            "What is 6 x 7?\n\n## Final answer criteria\nOne number.",
        )]))
        .await;

    assert_eq!(h.model.call_count(), 1);
    assert_eq!(prepared.outcome.decision, DecisionRecord::Answered("42".into()));
    assert!(!prepared.outcome.plan_created);
    assert!(prepared.outcome.status_note.is_none());
    assert!(h.plans.read(&session()).unwrap().is_none());

    let user = &prepared.messages[0].content;
    assert!(user.contains("## Planning decision\n42"));
    assert!(user.ends_with("## Final answer criteria\nOne number."));
    assert_eq!(count_containing(&prepared.messages, PLAN_BLOCK_HEADER), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Plan creation, isolation, compaction, file stores
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_turn_creates_plan_and_skips_evaluation() {
    let h = harness(
        ScriptedModel::with_texts([r#"{"needs_planning": true}"#, FRESH_PLAN]),
        OrchestratorConfig::default(),
    );

    let prepared = h.orchestrator.prepare(request(vec![Message::user("Show sales")])).await;

    assert_eq!(h.model.call_count(), 2);
    assert!(prepared.outcome.plan_created);
    assert!(!prepared.outcome.plan_evaluated);
    assert_eq!(prepared.outcome.decision, DecisionRecord::NeedsPlanning);
    let stored = h.plans.read(&session()).unwrap().unwrap();
    assert_eq!(stored.steps[0].description, "Fetch data");
    assert!(prepared.messages.last().unwrap().content.ends_with(KEEP_WORKING_NOTE));
}

#[tokio::test]
async fn sessions_do_not_see_each_others_plans() {
    let h = harness(
        ScriptedModel::with_texts([r#"{"result": "hi"}"#]),
        OrchestratorConfig::default(),
    );
    let plan = two_step_plan();
    h.plans.write(&SessionId::from("other"), &plan).unwrap();

    let prepared = h.orchestrator.prepare(request(vec![Message::user("hello")])).await;

    assert_matches!(prepared.outcome.decision, DecisionRecord::Answered(_));
    assert_eq!(h.plans.read(&SessionId::from("other")).unwrap(), Some(plan));
}

#[tokio::test]
async fn compaction_summaries_are_cached_across_turns() {
    let model = ScriptedModel::with_texts(["Actions performed:\n- queried sales"]);
    let config = OrchestratorConfig {
        planning_enabled: false,
        ..OrchestratorConfig::default()
    };
    let h = harness(model, config);

    let mut history = vec![Message::user("Analyze sales")];
    history.extend((0..9).map(|i| Message::assistant(format!("tool output {i}"))));

    let first = h.orchestrator.prepare(request(history.clone())).await;
    let second = h.orchestrator.prepare(request(history)).await;

    assert_eq!(h.model.call_count(), 1);
    assert_eq!(first.outcome.compacted_chunks, 1);
    assert_eq!(first.messages, second.messages);
    assert_eq!(count_containing(&first.messages, CHUNK_SUMMARY_MARKER), 1);
    assert_eq!(first.messages.len(), 7);
    assert_eq!(h.orchestrator.cache().len(), 1);
}

#[tokio::test]
async fn failed_summary_sends_uncompacted_history() {
    let model = ScriptedModel::new();
    model.push_error("summarizer down");
    let config = OrchestratorConfig {
        planning_enabled: false,
        ..OrchestratorConfig::default()
    };
    let h = harness(model, config);

    let mut history = vec![Message::user("Analyze sales")];
    history.extend((0..9).map(|i| Message::assistant(format!("tool output {i}"))));
    let prepared = h.orchestrator.prepare(request(history.clone())).await;

    assert!(prepared.outcome.compaction_fell_back);
    assert_eq!(prepared.messages, history);
}

#[tokio::test]
async fn file_backed_stores_persist_the_plan() {
    let dir = tempfile::tempdir().unwrap();
    let plans = Arc::new(FilePlanStore::new(dir.path().join("plans")));
    let context = Arc::new(FileContextStore::new(dir.path().join("context")));
    context
        .append(&session(), &StateEntry::new("warehouse online").with_agent_role("SQL Agent"))
        .unwrap();

    let model = Arc::new(ScriptedModel::with_texts([r#"{"needs_planning": true}"#, FRESH_PLAN]));
    let orchestrator = Orchestrator::new(
        model.clone(),
        plans.clone(),
        context,
        OrchestratorConfig::default(),
    );

    let prepared = orchestrator.prepare(request(vec![Message::user("Show sales")])).await;

    assert!(prepared.outcome.plan_created);
    assert!(dir.path().join("plans/session-1.plan.json").is_file());
    let raw = std::fs::read_to_string(dir.path().join("plans/session-1.plan.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["steps"][0]["coworker"], json!("SQL Agent"));
    // past projection of the log rides along with the outbound request
    assert_eq!(count_containing(&prepared.messages, "warehouse online"), 1);
    // and the last output reached the decision call
    assert_eq!(count_containing(&model.calls()[0], "warehouse online"), 1);
}
