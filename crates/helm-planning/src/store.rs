//! Session-keyed plan persistence.
//!
//! Absence of a plan is a valid state ("no plan yet"). The file backend
//! writes through a temp file and rename so a crashed write never leaves a
//! half-written plan behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use helm_core::errors::{StoreError, StoreResult};
use helm_core::ids::SessionId;
use helm_core::plan::Plan;

/// Persisted plan per session.
pub trait PlanStore: Send + Sync {
    /// Whether a plan exists for `session`.
    fn exists(&self, session: &SessionId) -> StoreResult<bool>;

    /// The plan for `session`, or `None` if there is none.
    fn read(&self, session: &SessionId) -> StoreResult<Option<Plan>>;

    /// Replace the plan for `session`.
    fn write(&self, session: &SessionId, plan: &Plan) -> StoreResult<()>;
}

/// In-memory plan store.
#[derive(Default)]
pub struct MemoryPlanStore {
    plans: DashMap<SessionId, Plan>,
}

impl MemoryPlanStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlanStore for MemoryPlanStore {
    fn exists(&self, session: &SessionId) -> StoreResult<bool> {
        Ok(self.plans.contains_key(session))
    }

    fn read(&self, session: &SessionId) -> StoreResult<Option<Plan>> {
        Ok(self.plans.get(session).map(|p| p.value().clone()))
    }

    fn write(&self, session: &SessionId, plan: &Plan) -> StoreResult<()> {
        let _ = self.plans.insert(session.clone(), plan.clone());
        Ok(())
    }
}

/// One `<session>.plan.json` file per session under a directory.
#[derive(Clone, Debug)]
pub struct FilePlanStore {
    dir: PathBuf,
}

impl FilePlanStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session: &SessionId) -> StoreResult<PathBuf> {
        if !session.is_path_safe() {
            return Err(StoreError::InvalidKey(session.to_string()));
        }
        Ok(self.dir.join(format!("{session}.plan.json")))
    }
}

impl PlanStore for FilePlanStore {
    fn exists(&self, session: &SessionId) -> StoreResult<bool> {
        Ok(self.path_for(session)?.is_file())
    }

    fn read(&self, session: &SessionId) -> StoreResult<Option<Plan>> {
        let path = self.path_for(session)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, session: &SessionId, plan: &Plan) -> StoreResult<()> {
        let path = self.path_for(session)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(plan)?)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(session_id = %session, path = %path.display(), "plan written");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
