//! Run-level sequencing, failure containment, and outcome aggregation.

use super::engine::{ReconcileEngine, SyncResult};
use crate::sync::domain::{ProjectId, RunMode, SyncOutcome, SyncReport};
use crate::sync::ports::{BusinessStore, CollaborationStore};
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Scope of one reconciliation run.
///
/// Carries the project the WBS surface is bound to and the cap applied to
/// the open-activity listing. Built from configuration and passed in at
/// call time, never read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncScope {
    project: Option<ProjectId>,
    open_task_limit: usize,
}

impl SyncScope {
    /// Default cap on the open-activity listing.
    pub const DEFAULT_OPEN_TASK_LIMIT: usize = 500;

    /// Creates an unscoped run with the default open-task cap.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            project: None,
            open_task_limit: Self::DEFAULT_OPEN_TASK_LIMIT,
        }
    }

    /// Binds the WBS surface to a project.
    #[must_use]
    pub const fn with_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Overrides the open-activity listing cap.
    #[must_use]
    pub const fn with_open_task_limit(mut self, limit: usize) -> Self {
        self.open_task_limit = limit;
        self
    }

    /// Returns the project binding, if any.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Returns the open-activity listing cap.
    #[must_use]
    pub const fn open_task_limit(&self) -> usize {
        self.open_task_limit
    }
}

impl Default for SyncScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Reconciliation run orchestrator.
///
/// Sequences the two record types in fixed order, checklist before WBS,
/// and contains per-record failures so one bad row costs one error tally
/// and nothing else. Snapshot and index fetches are not contained; without
/// a listing there is no batch to iterate.
#[derive(Clone)]
pub struct SyncOrchestrator<C, B, K>
where
    C: CollaborationStore,
    B: BusinessStore,
    K: Clock + Send + Sync,
{
    engine: ReconcileEngine<C, B, K>,
}

impl<C, B, K> SyncOrchestrator<C, B, K>
where
    C: CollaborationStore,
    B: BusinessStore,
    K: Clock + Send + Sync,
{
    /// Creates a new orchestrator over the two stores and a clock.
    #[must_use]
    pub const fn new(collaboration: Arc<C>, business: Arc<B>, clock: Arc<K>) -> Self {
        Self {
            engine: ReconcileEngine::new(collaboration, business, clock),
        }
    }

    /// Performs one reconciliation run.
    ///
    /// In full mode each record is pushed then pulled within the same
    /// pass; pull decisions read the indexes fetched before any push ran,
    /// so a record changed by its own push settles on the following run.
    /// A record whose push fails is not pulled, so each record counts at
    /// most one error per pass.
    ///
    /// # Errors
    ///
    /// Returns [`super::SyncError`] only for snapshot or index fetch
    /// failures; per-record write failures are contained in the tallies.
    pub async fn run(&self, mode: RunMode, scope: &SyncScope) -> SyncResult<SyncReport> {
        info!(%mode, "starting reconciliation run");
        let checklist = self.reconcile_checklist(mode, scope).await?;
        let wbs = self.reconcile_wbs(mode, scope).await?;
        let report = SyncReport::new(checklist, wbs);
        info!(total = %report.total(), "reconciliation run finished");
        Ok(report)
    }

    /// Reconciles the checklist surface.
    async fn reconcile_checklist(&self, mode: RunMode, scope: &SyncScope) -> SyncResult<SyncOutcome> {
        let items = self.engine.checklist_snapshot().await?;
        let open_tasks = self.engine.open_task_index(scope.open_task_limit()).await?;

        let mut tally = SyncOutcome::new();
        for item in &items {
            if mode.pushes() {
                match self.engine.push_checklist_item(item, &open_tasks).await {
                    Ok(step) => tally.record(step),
                    Err(err) => {
                        error!(item = %item.title(), direction = "push", error = %err, "checklist record failed");
                        tally.record_error();
                        continue;
                    }
                }
            }
            if mode.pulls() {
                match self.engine.pull_checklist_item(item, &open_tasks).await {
                    Ok(step) => tally.record(step),
                    Err(err) => {
                        error!(item = %item.title(), direction = "pull", error = %err, "checklist record failed");
                        tally.record_error();
                    }
                }
            }
        }
        info!(outcome = %tally, "checklist reconciliation finished");
        Ok(tally)
    }

    /// Reconciles the WBS surface.
    async fn reconcile_wbs(&self, mode: RunMode, scope: &SyncScope) -> SyncResult<SyncOutcome> {
        let items = self.engine.wbs_snapshot().await?;
        let wbs_tasks = match (mode.pulls(), scope.project()) {
            (true, Some(project)) => Some(self.engine.wbs_task_index(project).await?),
            (true, None) => {
                warn!("no project scope configured; skipping WBS pull");
                None
            }
            (false, _) => None,
        };
        if mode.pushes() && scope.project().is_none() {
            warn!("no project scope configured; created WBS tasks will not be bound to a project");
        }

        let mut tally = SyncOutcome::new();
        for item in &items {
            if mode.pushes() {
                match self.engine.push_wbs_item(item, scope.project()).await {
                    Ok(step) => tally.record(step),
                    Err(err) => {
                        error!(item = %item.title(), direction = "push", error = %err, "WBS record failed");
                        tally.record_error();
                        continue;
                    }
                }
            }
            if let Some(index) = wbs_tasks.as_ref() {
                match self.engine.pull_wbs_item(item, index).await {
                    Ok(step) => tally.record(step),
                    Err(err) => {
                        error!(item = %item.title(), direction = "pull", error = %err, "WBS record failed");
                        tally.record_error();
                    }
                }
            }
        }
        info!(outcome = %tally, "WBS reconciliation finished");
        Ok(tally)
    }
}
