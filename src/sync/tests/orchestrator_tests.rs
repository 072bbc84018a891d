//! Run-level tests for sequencing, mode gating, and failure containment.

use super::fixtures::{
    activity_a, activity_b, checklist_item, fixed_clock, project_scope, project_task_a, wbs_item,
};
use crate::sync::adapters::memory::{InMemoryBusinessStore, InMemoryCollaborationStore};
use crate::sync::domain::{ChecklistStatus, ListItemId, RunMode};
use crate::sync::ports::{CollaborationStoreError, MockBusinessStore, MockCollaborationStore};
use crate::sync::services::{SyncError, SyncOrchestrator, SyncScope};
use rstest::rstest;
use std::sync::Arc;

fn orchestrator(
    collaboration: &InMemoryCollaborationStore,
    business: &InMemoryBusinessStore,
) -> SyncOrchestrator<InMemoryCollaborationStore, InMemoryBusinessStore, super::fixtures::FixedClock>
{
    SyncOrchestrator::new(
        Arc::new(collaboration.clone()),
        Arc::new(business.clone()),
        Arc::new(fixed_clock()),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_run_creates_and_links_counterparts() {
    let collaboration = InMemoryCollaborationStore::new()
        .with_checklist_item(checklist_item(
            "1",
            "Migrate tenant data",
            ChecklistStatus::InProgress,
        ))
        .with_wbs_item(
            wbs_item("10", "Data migration", ChecklistStatus::InProgress, 25.0)
                .with_task_code("2.3"),
        );
    let business = InMemoryBusinessStore::new();
    let scope = SyncScope::new().with_project(project_scope());

    let report = orchestrator(&collaboration, &business)
        .run(RunMode::Full, &scope)
        .await
        .expect("run should succeed");

    assert_eq!(report.checklist().created(), 1);
    assert_eq!(report.checklist().skipped(), 1);
    assert_eq!(report.wbs().created(), 1);
    assert_eq!(report.wbs().skipped(), 1);
    assert!(!report.has_errors());

    let linked_item = collaboration
        .checklist_item(&ListItemId::new("1"))
        .expect("item should survive the run");
    assert!(linked_item.is_linked());

    let linked_wbs = collaboration
        .wbs_item(&ListItemId::new("10"))
        .expect("WBS item should survive the run");
    let project_task = linked_wbs
        .linked_project_task()
        .expect("WBS item should be linked");
    let counterpart = business
        .wbs_task(project_task)
        .expect("counterpart should exist");
    assert_eq!(counterpart.subject(), "2.3 Data migration");
    assert_eq!(business.task_count(), 1);
    assert_eq!(business.wbs_task_count(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_run_converges_checklist_and_keeps_overwriting_wbs() {
    let collaboration = InMemoryCollaborationStore::new()
        .with_checklist_item(checklist_item(
            "1",
            "Migrate tenant data",
            ChecklistStatus::InProgress,
        ))
        .with_wbs_item(
            wbs_item("10", "Data migration", ChecklistStatus::InProgress, 25.0)
                .with_task_code("2.3"),
        );
    let business = InMemoryBusinessStore::new();
    let scope = SyncScope::new().with_project(project_scope());
    let runner = orchestrator(&collaboration, &business);

    runner
        .run(RunMode::Full, &scope)
        .await
        .expect("first run should succeed");
    let second = runner
        .run(RunMode::Full, &scope)
        .await
        .expect("second run should succeed");

    assert_eq!(second.checklist().created(), 0);
    assert_eq!(second.checklist().updated(), 0);
    assert_eq!(second.checklist().skipped(), 2);
    assert_eq!(second.wbs().created(), 0);
    assert_eq!(second.wbs().updated(), 1);
    assert_eq!(second.wbs().skipped(), 1);

    assert_eq!(business.task_count(), 1);
    assert_eq!(business.wbs_task_count(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn push_mode_never_writes_pull_state_back() {
    let collaboration = InMemoryCollaborationStore::new().with_checklist_item(
        checklist_item("1", "Draft SOW", ChecklistStatus::InProgress)
            .with_linked_activity(activity_a()),
    );
    let business = InMemoryBusinessStore::new();

    let report = orchestrator(&collaboration, &business)
        .run(RunMode::Push, &SyncScope::new())
        .await
        .expect("run should succeed");

    assert_eq!(report.checklist().skipped(), 1);
    assert_eq!(report.checklist().updated(), 0);
    let item = collaboration
        .checklist_item(&ListItemId::new("1"))
        .expect("item should survive the run");
    assert_eq!(item.status(), ChecklistStatus::InProgress);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pull_mode_marks_departed_counterparts_completed() {
    let collaboration = InMemoryCollaborationStore::new().with_checklist_item(
        checklist_item("1", "Draft SOW", ChecklistStatus::InProgress)
            .with_linked_activity(activity_a()),
    );
    let business = InMemoryBusinessStore::new();

    let report = orchestrator(&collaboration, &business)
        .run(RunMode::Pull, &SyncScope::new())
        .await
        .expect("run should succeed");

    assert_eq!(report.checklist().updated(), 1);
    let item = collaboration
        .checklist_item(&ListItemId::new("1"))
        .expect("item should survive the run");
    assert_eq!(item.status(), ChecklistStatus::Completed);
    assert_eq!(business.task_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wbs_pull_without_project_scope_is_not_attempted() {
    let collaboration = InMemoryCollaborationStore::new().with_wbs_item(
        wbs_item("10", "Data migration", ChecklistStatus::InProgress, 10.0)
            .with_linked_project_task(project_task_a()),
    );
    let business = InMemoryBusinessStore::new();

    let report = orchestrator(&collaboration, &business)
        .run(RunMode::Pull, &SyncScope::new())
        .await
        .expect("run should succeed");

    assert_eq!(report.wbs().created(), 0);
    assert_eq!(report.wbs().updated(), 0);
    assert_eq!(report.wbs().skipped(), 0);
    let item = collaboration
        .wbs_item(&ListItemId::new("10"))
        .expect("item should survive the run");
    assert!((item.percent_complete().value() - 10.0).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn record_failure_is_contained_and_the_batch_continues() {
    let mut collaboration = MockCollaborationStore::new();
    collaboration.expect_fetch_checklist().times(1).returning(|| {
        Ok(vec![
            checklist_item("1", "Alpha", ChecklistStatus::InProgress)
                .with_linked_activity(activity_a()),
            checklist_item("2", "Beta", ChecklistStatus::InProgress)
                .with_linked_activity(activity_b()),
        ])
    });
    collaboration.expect_fetch_wbs().times(1).returning(|| Ok(Vec::new()));
    collaboration
        .expect_update_status()
        .withf(|id, _| id.as_str() == "1")
        .times(1)
        .returning(|_, _| {
            Err(CollaborationStoreError::transport(std::io::Error::other(
                "write refused",
            )))
        });
    collaboration
        .expect_update_status()
        .withf(|id, _| id.as_str() == "2")
        .times(1)
        .returning(|_, _| Ok(()));

    let mut business = MockBusinessStore::new();
    business
        .expect_fetch_open_tasks()
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let runner = SyncOrchestrator::new(
        Arc::new(collaboration),
        Arc::new(business),
        Arc::new(fixed_clock()),
    );
    let report = runner
        .run(RunMode::Pull, &SyncScope::new())
        .await
        .expect("run should survive a contained failure");

    assert_eq!(report.checklist().errors(), 1);
    assert_eq!(report.checklist().updated(), 1);
    assert!(report.has_errors());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn snapshot_failure_aborts_the_run() {
    let mut collaboration = MockCollaborationStore::new();
    collaboration.expect_fetch_checklist().times(1).returning(|| {
        Err(CollaborationStoreError::transport(std::io::Error::other(
            "listing unavailable",
        )))
    });

    let runner = SyncOrchestrator::new(
        Arc::new(collaboration),
        Arc::new(MockBusinessStore::new()),
        Arc::new(fixed_clock()),
    );
    let result = runner.run(RunMode::Full, &SyncScope::new()).await;

    assert!(matches!(result, Err(SyncError::Collaboration(_))));
}
