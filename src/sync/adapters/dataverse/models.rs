//! Wire formats for the business store's OData API.
//!
//! Rows are lenient on the way in: absent columns fall back to domain
//! defaults. Outbound payloads omit absent columns entirely so the store
//! never receives explicit nulls.

use crate::sync::domain::{
    ActivityId, BusinessSubStatus, BusinessTask, BusinessTaskDraft, BusinessTaskRef,
    BusinessTaskState, BusinessWbsTask, Progress, ProjectTaskId, WbsState, WbsTaskDraft,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One page of query results.
#[derive(Debug, Deserialize)]
pub(super) struct QueryPage<R> {
    /// Rows on this page.
    #[serde(default)]
    pub value: Vec<R>,
}

/// Activity row selected by the open-task query.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TaskRow {
    pub activityid: Uuid,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scheduledend: Option<String>,
    #[serde(default)]
    pub statecode: Option<i32>,
    #[serde(default)]
    pub statuscode: Option<i32>,
}

/// Activity row selected by the subject lookup.
#[derive(Debug, Default, Deserialize)]
pub(super) struct TaskRefRow {
    pub activityid: Uuid,
    #[serde(default)]
    pub statecode: Option<i32>,
}

/// Project task row selected by the project query.
#[derive(Debug, Default, Deserialize)]
pub(super) struct WbsRow {
    pub msdyn_projecttaskid: Uuid,
    #[serde(default)]
    pub msdyn_subject: Option<String>,
    #[serde(default)]
    pub msdyn_scheduledstart: Option<String>,
    #[serde(default)]
    pub msdyn_scheduledend: Option<String>,
    #[serde(default)]
    pub msdyn_progress: Option<f64>,
    #[serde(default)]
    pub statecode: Option<i32>,
}

/// Creation payload for an activity.
///
/// The open state code is the store default and is left off the wire; the
/// sub-status always travels so refinements land on creation.
#[derive(Debug, Serialize)]
pub(super) struct NewTaskPayload<'a> {
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scheduledend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    statecode: Option<i32>,
    statuscode: i32,
}

impl<'a> NewTaskPayload<'a> {
    /// Builds the creation payload a draft describes.
    pub(super) fn from_draft(draft: &'a BusinessTaskDraft) -> Self {
        let statecode = match draft.state() {
            BusinessTaskState::Open => None,
            closed => Some(closed.code()),
        };
        Self {
            subject: draft.subject(),
            description: draft.description(),
            scheduledend: draft.due_date().map(wire_timestamp),
            statecode,
            statuscode: draft.sub_status().code(),
        }
    }
}

/// Completion payload for an activity.
#[derive(Debug, Serialize)]
pub(super) struct CompleteTaskPayload {
    statecode: i32,
    statuscode: i32,
    actualend: String,
}

impl CompleteTaskPayload {
    /// Builds the closed-as-done payload for the given timestamp.
    pub(super) fn new(completed_on: DateTime<Utc>) -> Self {
        Self {
            statecode: BusinessTaskState::Completed.code(),
            statuscode: BusinessSubStatus::Completed.code(),
            actualend: wire_timestamp(completed_on),
        }
    }
}

/// Creation payload for a project task.
#[derive(Debug, Serialize)]
pub(super) struct NewWbsTaskPayload<'a> {
    msdyn_subject: &'a str,
    msdyn_progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    msdyn_scheduledstart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    msdyn_scheduledend: Option<String>,
    #[serde(
        rename = "msdyn_project@odata.bind",
        skip_serializing_if = "Option::is_none"
    )]
    project_binding: Option<String>,
}

impl<'a> NewWbsTaskPayload<'a> {
    /// Builds the creation payload a draft describes, binding the parent
    /// project when the draft carries one.
    pub(super) fn from_draft(draft: &'a WbsTaskDraft) -> Self {
        Self {
            msdyn_subject: draft.subject(),
            msdyn_progress: draft.progress().value(),
            msdyn_scheduledstart: draft.scheduled_start().map(wire_timestamp),
            msdyn_scheduledend: draft.scheduled_end().map(wire_timestamp),
            project_binding: draft
                .project()
                .map(|project| format!("/msdyn_projects({project})")),
        }
    }
}

/// Progress patch for a project task.
#[derive(Debug, Serialize)]
pub(super) struct WbsProgressPayload {
    msdyn_progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    statecode: Option<i32>,
}

impl WbsProgressPayload {
    /// Builds the progress patch, closing the task when `complete` is set.
    pub(super) fn new(progress: Progress, complete: bool) -> Self {
        Self {
            msdyn_progress: progress.value(),
            statecode: complete.then(|| WbsState::Completed.code()),
        }
    }
}

/// Builds the domain activity snapshot from one query row.
pub(super) fn business_task_from(row: TaskRow) -> BusinessTask {
    let state = BusinessTaskState::from_code(row.statecode.unwrap_or_default());
    let sub_status = BusinessSubStatus::from_code(row.statuscode.unwrap_or_default());
    let mut task = BusinessTask::new(
        ActivityId::from_uuid(row.activityid),
        row.subject.unwrap_or_default(),
        state,
        sub_status,
    );
    if let Some(description) = row.description.filter(|text| !text.is_empty()) {
        task = task.with_description(description);
    }
    if let Some(due_date) = row.scheduledend.as_deref().and_then(parse_timestamp) {
        task = task.with_due_date(due_date);
    }
    task
}

/// Builds the lookup result from one query row.
pub(super) fn task_ref_from(row: TaskRefRow) -> BusinessTaskRef {
    BusinessTaskRef::new(
        ActivityId::from_uuid(row.activityid),
        BusinessTaskState::from_code(row.statecode.unwrap_or_default()),
    )
}

/// Builds the domain project task snapshot from one query row.
pub(super) fn wbs_task_from(row: WbsRow) -> BusinessWbsTask {
    let mut task = BusinessWbsTask::new(
        ProjectTaskId::from_uuid(row.msdyn_projecttaskid),
        row.msdyn_subject.unwrap_or_default(),
        Progress::new(row.msdyn_progress.unwrap_or_default()),
        WbsState::from_code(row.statecode.unwrap_or_default()),
    );
    if let Some(start) = row.msdyn_scheduledstart.as_deref().and_then(parse_timestamp) {
        task = task.with_scheduled_start(start);
    }
    if let Some(end) = row.msdyn_scheduledend.as_deref().and_then(parse_timestamp) {
        task = task.with_scheduled_end(end);
    }
    task
}

/// Extracts the record GUID from an `OData-EntityId` header value, which
/// carries the new record's URL ending in `(GUID)`.
pub(super) fn entity_id_from_header(raw: &str) -> Option<Uuid> {
    let open = raw.rfind('(')?;
    let close = raw.rfind(')')?;
    let inner = raw.get(open + 1..close)?;
    Uuid::parse_str(inner).ok()
}

/// Escapes text for use inside a single-quoted OData literal.
pub(super) fn odata_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Renders a timestamp in the store's wire format.
fn wire_timestamp(stamp: DateTime<Utc>) -> String {
    stamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses the store's timestamp renderings.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|stamped| stamped.with_timezone(&Utc))
}
