//! The orchestration pass.
//!
//! ```text
//! sanitize → compact → decision (no plan yet) → planner (if needed)
//!          → evaluator (plan existed before this turn) → inject → submit
//! ```
//!
//! Every step fails open: a failed model call, summary, or store access
//! degrades to the most recent well-defined input and the pass continues.
//! The only error a caller sees is the final submit call's own.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use helm_context::{
    CachedSummarizer, ContextCompactor, ContextStore, FileContextStore, Projections, SignatureCache,
};
use helm_core::ids::SessionId;
use helm_core::messages::Message;
use helm_core::plan::Plan;
use helm_llm::{ModelClient, ModelResult};
use helm_planning::decision::apply_answer;
use helm_planning::{
    Decision, DecisionOutcome, EvaluationOutcome, Evaluator, FilePlanStore, PlanStore, Planner,
    PlannerOutcome, inject_plan, select_next_step,
};
use helm_settings::{HelmSettings, expand_home};

use super::config::OrchestratorConfig;
use super::turn::{DecisionRecord, OrchestrationRequest, PreparedTurn, TurnOutcome, TurnResult};
use crate::sanitize::sanitize;
use crate::session::SessionRegistry;

/// Notice shown once when planning is disabled for a session.
pub const PLANNING_DISABLED_NOTICE: &str = "[NOTICE] Planning has been disabled for the rest of \
this conversation because no valid plan could be produced. Requests will be handled \
without a plan.";

/// Planner/evaluator control loop over one model.
pub struct Orchestrator {
    model: Arc<dyn ModelClient>,
    plans: Arc<dyn PlanStore>,
    context: Arc<dyn ContextStore>,
    sessions: SessionRegistry,
    summarizer: CachedSummarizer,
    compactor: ContextCompactor,
    decision: Decision,
    planner: Planner,
    evaluator: Evaluator,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator with its own summary cache.
    pub fn new(
        model: Arc<dyn ModelClient>,
        plans: Arc<dyn PlanStore>,
        context: Arc<dyn ContextStore>,
        config: OrchestratorConfig,
    ) -> Self {
        let cache = Arc::new(SignatureCache::new(config.cache_capacity));
        Self::with_cache(model, plans, context, cache, config)
    }

    /// Create an orchestrator sharing an existing summary cache.
    pub fn with_cache(
        model: Arc<dyn ModelClient>,
        plans: Arc<dyn PlanStore>,
        context: Arc<dyn ContextStore>,
        cache: Arc<SignatureCache>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            summarizer: CachedSummarizer::new(Arc::clone(&model), cache),
            compactor: ContextCompactor::new(config.compaction_window),
            decision: Decision::new(Arc::clone(&model)),
            planner: Planner::new(Arc::clone(&model), config.max_attempts),
            evaluator: Evaluator::new(Arc::clone(&model), config.enforce_locks),
            sessions: SessionRegistry::new(),
            model,
            plans,
            context,
            config,
        }
    }

    /// Create an orchestrator with file-backed stores from `settings`.
    pub fn from_settings(model: Arc<dyn ModelClient>, settings: &HelmSettings) -> Self {
        let plans = Arc::new(FilePlanStore::new(expand_home(&settings.storage.plans_dir)));
        let context = Arc::new(FileContextStore::new(expand_home(&settings.storage.context_dir)));
        Self::new(model, plans, context, OrchestratorConfig::from_settings(settings))
    }

    /// Configuration in effect.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Per-session flags.
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Shared summary cache.
    pub fn cache(&self) -> &Arc<SignatureCache> {
        self.summarizer.cache()
    }

    /// Prepare and submit one request.
    pub async fn run(&self, request: OrchestrationRequest) -> ModelResult<TurnResult> {
        let prepared = self.prepare(request).await;
        let output = self.model.call(&prepared.messages).await?;
        Ok(TurnResult {
            output,
            messages: prepared.messages,
            outcome: prepared.outcome,
        })
    }

    /// Compute the outbound messages for one request without submitting.
    #[instrument(skip_all, fields(session_id = %request.session_id, agent_id = %request.agent_id))]
    pub async fn prepare(&self, request: OrchestrationRequest) -> PreparedTurn {
        let session = &request.session_id;
        let mut outcome = TurnOutcome::default();

        let messages = sanitize(&request.messages);
        let projections = self.projections(session);

        let working = if self.config.compaction_enabled {
            let compaction = self
                .compactor
                .compact(&messages, request.agent_id.as_str(), &self.summarizer)
                .await;
            outcome.compacted_chunks = compaction.chunks_summarized;
            outcome.compaction_fell_back = compaction.fell_back;
            compaction.messages
        } else {
            messages
        };

        let mut outbound = working.clone();
        projections.insert_for_passthrough(&mut outbound);

        if !self.config.planning_enabled || self.sessions.is_planning_disabled(session) {
            debug!("planning off for this pass");
            return PreparedTurn {
                messages: outbound,
                outcome,
            };
        }

        let existing = self.read_plan(session);
        let plan = match existing {
            Some(current) => Some(
                self.evaluate(&request, &working, &projections, current, &mut outcome)
                    .await,
            ),
            None => {
                match self.decision.decide(&working, &projections).await {
                    DecisionOutcome::Answered(answer) => {
                        info!("answered without planning");
                        apply_answer(&mut outbound, &answer);
                        outcome.decision = DecisionRecord::Answered(answer);
                        return PreparedTurn {
                            messages: outbound,
                            outcome,
                        };
                    }
                    DecisionOutcome::NeedsPlanning => {
                        outcome.decision = DecisionRecord::NeedsPlanning;
                    }
                }
                self.create_plan(&request, &working, &projections, &mut outcome)
                    .await
            }
        };

        if let Some(plan) = plan {
            let next_step = select_next_step(&plan);
            let note = inject_plan(&mut outbound, &plan, &next_step);
            debug!(next_step = %next_step, note = note.kind(), "plan injected");
            outcome.next_step = Some(next_step);
            outcome.status_note = Some(note.kind().to_owned());
        }

        for notice in &outcome.notices {
            outbound.push(Message::user(notice.clone()));
        }

        PreparedTurn {
            messages: outbound,
            outcome,
        }
    }

    fn projections(&self, session: &SessionId) -> Projections {
        match self.context.entries(session) {
            Ok(entries) => Projections::from_entries(&entries, &self.config.orchestrator_role),
            Err(error) => {
                warn!(error = %error, "state entries unreadable, continuing without them");
                Projections::default()
            }
        }
    }

    fn read_plan(&self, session: &SessionId) -> Option<Plan> {
        match self.plans.read(session) {
            Ok(plan) => plan,
            Err(error) => {
                warn!(error = %error, "plan unreadable, continuing as if none exists");
                None
            }
        }
    }

    fn write_plan(&self, session: &SessionId, plan: &Plan) {
        if let Err(error) = self.plans.write(session, plan) {
            warn!(error = %error, "plan write failed, using in-process copy for this pass");
        }
    }

    async fn create_plan(
        &self,
        request: &OrchestrationRequest,
        working: &[Message],
        projections: &Projections,
        outcome: &mut TurnOutcome,
    ) -> Option<Plan> {
        let session = &request.session_id;
        match self
            .planner
            .plan(working, &request.coworkers, projections)
            .await
        {
            PlannerOutcome::Created { plan, .. } => {
                self.write_plan(session, &plan);
                outcome.plan_created = true;
                Some(plan)
            }
            PlannerOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                warn!(attempts, error = %last_error, "planner exhausted its attempts");
                if self.sessions.disable_planning(session) {
                    outcome.notices.push(PLANNING_DISABLED_NOTICE.to_owned());
                }
                None
            }
            PlannerOutcome::Aborted(_) => None,
        }
    }

    async fn evaluate(
        &self,
        request: &OrchestrationRequest,
        working: &[Message],
        projections: &Projections,
        current: Plan,
        outcome: &mut TurnOutcome,
    ) -> Plan {
        match self
            .evaluator
            .evaluate(working, &request.coworkers, projections, &current)
            .await
        {
            EvaluationOutcome::Updated(plan) => {
                self.write_plan(&request.session_id, &plan);
                outcome.plan_evaluated = true;
                plan
            }
            EvaluationOutcome::Invalid(_)
            | EvaluationOutcome::Violations(_)
            | EvaluationOutcome::Failed(_) => current,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
