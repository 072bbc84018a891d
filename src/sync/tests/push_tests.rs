//! Unit tests for per-record push decisions.

use super::fixtures::{
    FixedClock, activity_a, checklist_item, fixed_clock, open_activity, project_scope,
    project_task_a, run_instant, wbs_item,
};
use crate::sync::domain::{
    BusinessSubStatus, BusinessTaskRef, BusinessTaskState, ChecklistStatus, StepOutcome,
};
use crate::sync::ports::{MockBusinessStore, MockCollaborationStore};
use crate::sync::services::{OpenTaskIndex, ReconcileEngine};
use eyre::ensure;
use rstest::rstest;
use std::sync::Arc;

type TestEngine = ReconcileEngine<MockCollaborationStore, MockBusinessStore, FixedClock>;

fn engine(collaboration: MockCollaborationStore, business: MockBusinessStore) -> TestEngine {
    ReconcileEngine::new(
        Arc::new(collaboration),
        Arc::new(business),
        Arc::new(fixed_clock()),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unlinked_item_creates_a_counterpart_and_links_back() -> eyre::Result<()> {
    let item = checklist_item("1", "Draft SOW", ChecklistStatus::NotStarted)
        .with_notes("Scope the engagement")
        .with_due_date(run_instant());

    let mut business = MockBusinessStore::new();
    business
        .expect_find_task_by_subject()
        .withf(|subject| subject == "Draft SOW")
        .times(1)
        .returning(|_| Ok(None));
    business
        .expect_create_task()
        .withf(|draft| {
            draft.subject() == "Draft SOW"
                && draft.state() == BusinessTaskState::Open
                && draft.sub_status() == BusinessSubStatus::NotStarted
                && draft.description() == Some("Scope the engagement")
                && draft.due_date() == Some(run_instant())
        })
        .times(1)
        .returning(|_| Ok(activity_a()));

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_link_business_task()
        .withf(|id, activity| id.as_str() == "1" && *activity == activity_a())
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_checklist_item(&item, &OpenTaskIndex::default())
        .await?;
    ensure!(outcome == StepOutcome::Created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_item_without_counterpart_creates_one_already_closed() -> eyre::Result<()> {
    let item = checklist_item("3", "Sign off UAT", ChecklistStatus::Completed);

    let mut business = MockBusinessStore::new();
    business
        .expect_find_task_by_subject()
        .times(1)
        .returning(|_| Ok(None));
    business
        .expect_create_task()
        .withf(|draft| {
            draft.state() == BusinessTaskState::Completed
                && draft.sub_status() == BusinessSubStatus::Completed
        })
        .times(1)
        .returning(|_| Ok(activity_a()));
    business.expect_complete_task().never();

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_link_business_task()
        .withf(|id, activity| id.as_str() == "3" && *activity == activity_a())
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_checklist_item(&item, &OpenTaskIndex::default())
        .await?;
    ensure!(outcome == StepOutcome::Created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn linked_item_short_of_completion_is_left_alone() -> eyre::Result<()> {
    let item = checklist_item("1", "Draft SOW", ChecklistStatus::InProgress)
        .with_linked_activity(activity_a());
    let open_tasks = OpenTaskIndex::from_tasks(&[open_activity(activity_a(), "Draft SOW")]);

    let mut business = MockBusinessStore::new();
    business.expect_complete_task().never();

    let outcome = engine(MockCollaborationStore::new(), business)
        .push_checklist_item(&item, &open_tasks)
        .await?;
    ensure!(outcome == StepOutcome::Skipped);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_item_closes_its_open_counterpart() -> eyre::Result<()> {
    let item = checklist_item("1", "Draft SOW", ChecklistStatus::Completed)
        .with_linked_activity(activity_a());
    let open_tasks = OpenTaskIndex::from_tasks(&[open_activity(activity_a(), "Draft SOW")]);

    let mut business = MockBusinessStore::new();
    business
        .expect_complete_task()
        .withf(|activity, completed_on| {
            *activity == activity_a() && *completed_on == run_instant()
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(MockCollaborationStore::new(), business)
        .push_checklist_item(&item, &open_tasks)
        .await?;
    ensure!(outcome == StepOutcome::Updated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn departed_counterpart_is_never_touched_again() -> eyre::Result<()> {
    let item = checklist_item("1", "Draft SOW", ChecklistStatus::Completed)
        .with_linked_activity(activity_a());

    let mut business = MockBusinessStore::new();
    business.expect_complete_task().never();

    let outcome = engine(MockCollaborationStore::new(), business)
        .push_checklist_item(&item, &OpenTaskIndex::default())
        .await?;
    ensure!(outcome == StepOutcome::Skipped);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adoption_links_an_existing_open_activity_and_completes_it() -> eyre::Result<()> {
    let item = checklist_item("2", "Review legal terms", ChecklistStatus::Completed);

    let mut business = MockBusinessStore::new();
    business
        .expect_find_task_by_subject()
        .withf(|subject| subject == "Review legal terms")
        .times(1)
        .returning(|_| {
            Ok(Some(BusinessTaskRef::new(
                activity_a(),
                BusinessTaskState::Open,
            )))
        });
    business.expect_create_task().never();
    business
        .expect_complete_task()
        .withf(|activity, completed_on| {
            *activity == activity_a() && *completed_on == run_instant()
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_link_business_task()
        .withf(|id, activity| id.as_str() == "2" && *activity == activity_a())
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_checklist_item(&item, &OpenTaskIndex::default())
        .await?;
    ensure!(outcome == StepOutcome::Updated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adopting_a_closed_activity_does_not_reopen_it() -> eyre::Result<()> {
    let item = checklist_item("2", "Review legal terms", ChecklistStatus::Completed);

    let mut business = MockBusinessStore::new();
    business
        .expect_find_task_by_subject()
        .withf(|subject| subject == "Review legal terms")
        .times(1)
        .returning(|_| {
            Ok(Some(BusinessTaskRef::new(
                activity_a(),
                BusinessTaskState::Completed,
            )))
        });
    business.expect_complete_task().never();

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_link_business_task()
        .times(1)
        .returning(|_, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_checklist_item(&item, &OpenTaskIndex::default())
        .await?;
    ensure!(outcome == StepOutcome::Skipped);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn linked_wbs_item_overwrites_business_progress() -> eyre::Result<()> {
    let item = wbs_item("10", "Data migration", ChecklistStatus::InProgress, 62.5)
        .with_linked_project_task(project_task_a());

    let mut business = MockBusinessStore::new();
    business
        .expect_update_wbs_progress()
        .withf(|project_task, progress, complete| {
            *project_task == project_task_a()
                && (progress.value() - 62.5).abs() < f64::EPSILON
                && !*complete
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let outcome = engine(MockCollaborationStore::new(), business)
        .push_wbs_item(&item, Some(project_scope()))
        .await?;
    ensure!(outcome == StepOutcome::Updated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_wbs_item_closes_its_counterpart() -> eyre::Result<()> {
    let item = wbs_item("10", "Data migration", ChecklistStatus::Completed, 100.0)
        .with_linked_project_task(project_task_a());

    let mut business = MockBusinessStore::new();
    business
        .expect_update_wbs_progress()
        .withf(|project_task, progress, complete| {
            *project_task == project_task_a()
                && (progress.value() - 100.0).abs() < f64::EPSILON
                && *complete
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let outcome = engine(MockCollaborationStore::new(), business)
        .push_wbs_item(&item, Some(project_scope()))
        .await?;
    ensure!(outcome == StepOutcome::Updated);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unlinked_wbs_item_creates_a_scoped_counterpart() -> eyre::Result<()> {
    let item = wbs_item("10", "Data migration", ChecklistStatus::InProgress, 25.0)
        .with_task_code("2.3")
        .with_start_date(run_instant());

    let mut business = MockBusinessStore::new();
    business
        .expect_create_wbs_task()
        .withf(|draft| {
            draft.subject() == "2.3 Data migration"
                && draft.project() == Some(project_scope())
                && (draft.progress().value() - 25.0).abs() < f64::EPSILON
                && draft.scheduled_start() == Some(run_instant())
                && draft.scheduled_end().is_none()
        })
        .times(1)
        .returning(|_| Ok(project_task_a()));

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_update_wbs_progress()
        .withf(|id, progress, status, project_task| {
            id.as_str() == "10"
                && (progress.value() - 25.0).abs() < f64::EPSILON
                && status.is_none()
                && *project_task == project_task_a()
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_wbs_item(&item, Some(project_scope()))
        .await?;
    ensure!(outcome == StepOutcome::Created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unlinked_wbs_item_without_scope_creates_an_unbound_counterpart() -> eyre::Result<()> {
    let item = wbs_item("11", "Stand up environments", ChecklistStatus::NotStarted, 0.0);

    let mut business = MockBusinessStore::new();
    business
        .expect_create_wbs_task()
        .withf(|draft| draft.project().is_none() && draft.subject() == "Stand up environments")
        .times(1)
        .returning(|_| Ok(project_task_a()));

    let mut collaboration = MockCollaborationStore::new();
    collaboration
        .expect_update_wbs_progress()
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let outcome = engine(collaboration, business)
        .push_wbs_item(&item, None)
        .await?;
    ensure!(outcome == StepOutcome::Created);
    Ok(())
}
