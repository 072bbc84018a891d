//! Wire formats for the collaboration store's list API.
//!
//! List items arrive as envelopes whose columns live under an expanded
//! `fields` object. Column values are lenient on the way in: absent or
//! unparseable values fall back to domain defaults rather than failing
//! the whole snapshot.

use crate::sync::domain::{
    ActivityId, ChecklistItem, ChecklistStatus, ListItemId, Progress, ProjectTaskId, WbsItem,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// One page of list items, with the continuation link when more follow.
#[derive(Debug, Deserialize)]
pub(super) struct ListPage<F> {
    /// Items on this page.
    #[serde(default)]
    pub value: Vec<ListItem<F>>,
    /// Absolute URL of the next page, when the result set continues.
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// One list item envelope with its expanded column payload.
#[derive(Debug, Deserialize)]
pub(super) struct ListItem<F> {
    /// Store-assigned item identifier.
    pub id: String,
    /// Expanded columns, absent when the expansion returned nothing.
    pub fields: Option<F>,
}

/// Columns selected from the checklist list.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(super) struct ChecklistFields {
    pub title: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub assigned_to: Option<PersonField>,
    pub priority: Option<String>,
    pub notes: Option<String>,
    pub d365_task_id: Option<String>,
}

/// Columns selected from the WBS list.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(super) struct WbsFields {
    pub title: Option<String>,
    pub phase: Option<String>,
    pub task_code: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub percent_complete: Option<f64>,
    pub dependencies: Option<String>,
    pub d365_project_task_id: Option<String>,
}

/// Person or group column value, which the API renders in several shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum PersonField {
    /// Single lookup entry.
    Entry(PersonEntry),
    /// Multi-valued person column.
    Many(Vec<PersonEntry>),
    /// Plain display text.
    Text(String),
    /// Any other rendering, carried but not interpreted.
    Other(serde_json::Value),
}

impl PersonField {
    /// Extracts the display name, when one is present.
    pub(super) fn display_name(&self) -> Option<String> {
        match self {
            Self::Entry(entry) => entry.display_name(),
            Self::Many(entries) => entries.first().and_then(PersonEntry::display_name),
            Self::Text(text) => Some(text.clone()),
            Self::Other(_) => None,
        }
    }
}

/// Lookup entry carried inside a person column.
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct PersonEntry {
    #[serde(rename = "LookupValue")]
    lookup_value: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
}

impl PersonEntry {
    fn display_name(&self) -> Option<String> {
        self.lookup_value.clone().or_else(|| self.title.clone())
    }
}

/// Site resolution response.
#[derive(Debug, Deserialize)]
pub(super) struct SiteResource {
    /// Composite site identifier used in list URLs.
    pub id: String,
}

/// List resolution response.
#[derive(Debug, Deserialize)]
pub(super) struct ListResource {
    /// List identifier used in item URLs.
    pub id: String,
}

/// Builds the domain checklist snapshot from one list item.
pub(super) fn checklist_item_from(entry: ListItem<ChecklistFields>) -> ChecklistItem {
    let fields = entry.fields.unwrap_or_default();
    let status = fields
        .status
        .as_deref()
        .map_or(ChecklistStatus::NotStarted, ChecklistStatus::from_raw);
    let mut item = ChecklistItem::new(
        ListItemId::new(entry.id),
        fields.title.unwrap_or_default(),
        status,
    );
    if let Some(due_date) = fields.due_date.as_deref().and_then(parse_timestamp) {
        item = item.with_due_date(due_date);
    }
    let assignee = fields
        .assigned_to
        .as_ref()
        .and_then(PersonField::display_name);
    if let Some(name) = non_empty(assignee) {
        item = item.with_assignee(name);
    }
    if let Some(priority) = non_empty(fields.priority) {
        item = item.with_priority(priority);
    }
    if let Some(notes) = non_empty(fields.notes) {
        item = item.with_notes(notes);
    }
    if let Some(activity) = fields.d365_task_id.as_deref().and_then(parse_guid) {
        item = item.with_linked_activity(ActivityId::from_uuid(activity));
    }
    item
}

/// Builds the domain WBS snapshot from one list item.
pub(super) fn wbs_item_from(entry: ListItem<WbsFields>) -> WbsItem {
    let fields = entry.fields.unwrap_or_default();
    let status = fields
        .status
        .as_deref()
        .map_or(ChecklistStatus::NotStarted, ChecklistStatus::from_raw);
    let percent = Progress::new(fields.percent_complete.unwrap_or_default());
    let mut item = WbsItem::new(
        ListItemId::new(entry.id),
        fields.title.unwrap_or_default(),
        status,
        percent,
    );
    if let Some(phase) = non_empty(fields.phase) {
        item = item.with_phase(phase);
    }
    if let Some(task_code) = non_empty(fields.task_code) {
        item = item.with_task_code(task_code);
    }
    if let Some(start_date) = fields.start_date.as_deref().and_then(parse_timestamp) {
        item = item.with_start_date(start_date);
    }
    if let Some(due_date) = fields.due_date.as_deref().and_then(parse_timestamp) {
        item = item.with_due_date(due_date);
    }
    if let Some(dependencies) = non_empty(fields.dependencies) {
        item = item.with_dependencies(dependencies);
    }
    if let Some(task) = fields.d365_project_task_id.as_deref().and_then(parse_guid) {
        item = item.with_linked_project_task(ProjectTaskId::from_uuid(task));
    }
    item
}

/// Parses the store's date renderings, which are RFC 3339 or bare dates.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(stamped) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamped.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
}

/// Parses a cross-reference GUID, discarding empty or malformed text.
fn parse_guid(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Discards absent or blank column text.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn checklist_entry(fields: serde_json::Value) -> ListItem<ChecklistFields> {
        serde_json::from_value(json!({ "id": "14", "fields": fields }))
            .expect("checklist entry should deserialize")
    }

    fn wbs_entry(fields: serde_json::Value) -> ListItem<WbsFields> {
        serde_json::from_value(json!({ "id": "7", "fields": fields }))
            .expect("WBS entry should deserialize")
    }

    #[test]
    fn checklist_entry_maps_all_columns() {
        let entry = checklist_entry(json!({
            "Title": "Review contract",
            "Status": "In Progress",
            "DueDate": "2025-08-01T00:00:00Z",
            "AssignedTo": { "LookupValue": "Dana Smith" },
            "Priority": "High",
            "Notes": "Legal review first",
            "D365TaskId": "8e7f4f4e-9c93-4a41-8a4f-111111111111"
        }));

        let item = checklist_item_from(entry);

        assert_eq!(item.id().as_str(), "14");
        assert_eq!(item.title(), "Review contract");
        assert_eq!(item.status(), ChecklistStatus::InProgress);
        assert!(item.due_date().is_some());
        assert_eq!(item.assignee(), Some("Dana Smith"));
        assert_eq!(item.priority(), Some("High"));
        assert_eq!(item.notes(), Some("Legal review first"));
        assert!(item.is_linked());
    }

    #[test]
    fn missing_columns_fall_back_to_defaults() {
        let entry: ListItem<ChecklistFields> =
            serde_json::from_value(json!({ "id": "3" })).expect("bare entry should deserialize");

        let item = checklist_item_from(entry);

        assert_eq!(item.title(), "");
        assert_eq!(item.status(), ChecklistStatus::NotStarted);
        assert_eq!(item.assignee(), None);
        assert!(!item.is_linked());
    }

    #[rstest]
    #[case::lookup(json!({ "LookupValue": "Dana Smith", "Title": "ignored" }), Some("Dana Smith"))]
    #[case::title_fallback(json!({ "Title": "Dana Smith" }), Some("Dana Smith"))]
    #[case::multi_valued(json!([{ "LookupValue": "First" }, { "LookupValue": "Second" }]), Some("First"))]
    #[case::plain_text(json!("Dana Smith"), Some("Dana Smith"))]
    #[case::empty_object(json!({}), None)]
    #[case::numeric(json!(7), None)]
    fn person_column_shapes_resolve(
        #[case] value: serde_json::Value,
        #[case] expected: Option<&str>,
    ) {
        let entry = checklist_entry(json!({ "Title": "t", "AssignedTo": value }));

        let item = checklist_item_from(entry);

        assert_eq!(item.assignee(), expected);
    }

    #[rstest]
    #[case::unknown_text("Blocked", ChecklistStatus::NotStarted)]
    #[case::waiting("Waiting on someone else", ChecklistStatus::WaitingOnOther)]
    #[case::deferred("Deferred", ChecklistStatus::Deferred)]
    fn status_text_maps_with_fallback(#[case] raw: &str, #[case] expected: ChecklistStatus) {
        let entry = checklist_entry(json!({ "Title": "t", "Status": raw }));

        assert_eq!(checklist_item_from(entry).status(), expected);
    }

    #[test]
    fn malformed_cross_reference_reads_as_unlinked() {
        let entry = checklist_entry(json!({ "Title": "t", "D365TaskId": "not-a-guid" }));

        assert!(!checklist_item_from(entry).is_linked());
    }

    #[test]
    fn bare_date_column_parses_at_midnight() {
        let entry = checklist_entry(json!({ "Title": "t", "DueDate": "2025-08-01" }));

        let due = checklist_item_from(entry).due_date().expect("date should parse");
        assert_eq!(due.to_rfc3339(), "2025-08-01T00:00:00+00:00");
    }

    #[test]
    fn wbs_entry_maps_progress_and_linkage() {
        let entry = wbs_entry(json!({
            "Title": "Data migration",
            "Phase": "Phase 2: Execution",
            "TaskCode": "2.3",
            "Status": "In Progress",
            "PercentComplete": 135.0,
            "D365ProjectTaskId": "0c1d7f39-55d4-4c58-9d10-222222222222"
        }));

        let item = wbs_item_from(entry);

        assert_eq!(item.task_code(), Some("2.3"));
        assert_eq!(item.business_subject(), "2.3 Data migration");
        assert!((item.percent_complete().value() - 100.0).abs() < f64::EPSILON);
        assert!(item.is_linked());
    }

    #[test]
    fn page_continuation_link_is_captured() {
        let page: ListPage<ChecklistFields> = serde_json::from_value(json!({
            "value": [{ "id": "1", "fields": { "Title": "a" } }],
            "@odata.nextLink": "https://example.test/next"
        }))
        .expect("page should deserialize");

        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_link.as_deref(), Some("https://example.test/next"));
    }
}
