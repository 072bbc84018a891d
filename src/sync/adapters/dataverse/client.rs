//! HTTP client for the business store's OData API.

use super::models::{
    self, CompleteTaskPayload, NewTaskPayload, NewWbsTaskPayload, QueryPage, TaskRefRow, TaskRow,
    WbsProgressPayload, WbsRow,
};
use crate::sync::domain::{
    ActivityId, BusinessTask, BusinessTaskDraft, BusinessTaskRef, BusinessWbsTask, Progress,
    ProjectId, ProjectTaskId, WbsTaskDraft,
};
use crate::sync::ports::{
    AccessToken, BusinessStore, BusinessStoreError, BusinessStoreResult, TokenProvider,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// OData protocol version the store requires.
const ODATA_VERSION: &str = "4.0";

/// Web API version segment baked into every request path.
const API_VERSION: &str = "v9.2";

/// Preference asking the store to annotate rows with display values.
const FORMATTED_VALUES: &str = "odata.include-annotations=OData.Community.Display.V1.FormattedValue";

/// Columns selected by the open-task query.
const TASK_COLUMNS: &str = "activityid,subject,description,scheduledend,statecode,statuscode";

/// Columns selected by the project task query.
const WBS_COLUMNS: &str =
    "msdyn_projecttaskid,msdyn_subject,msdyn_scheduledstart,msdyn_scheduledend,msdyn_progress,statecode";

/// Upper bound on project task rows fetched per project.
const WBS_QUERY_LIMIT: usize = 200;

/// Connection settings for the business store.
#[derive(Debug, Clone)]
pub struct DataverseSettings {
    resource_url: Url,
}

impl DataverseSettings {
    /// Creates settings for one organization resource.
    #[must_use]
    pub const fn new(resource_url: Url) -> Self {
        Self { resource_url }
    }

    /// Returns the organization resource URL.
    #[must_use]
    pub const fn resource_url(&self) -> &Url {
        &self.resource_url
    }
}

/// Business store backed by the organization's OData API.
///
/// Queries are bounded by explicit `$top` limits; creations return the
/// store-assigned identifier parsed from the entity header.
pub struct DataverseBusinessStore<T> {
    client: Client,
    settings: DataverseSettings,
    tokens: Arc<T>,
}

impl<T: TokenProvider> DataverseBusinessStore<T> {
    /// Creates a store over the given settings and token issuer.
    #[must_use]
    pub fn new(settings: DataverseSettings, tokens: Arc<T>) -> Self {
        Self {
            client: Client::new(),
            settings,
            tokens,
        }
    }

    fn api_base(&self) -> String {
        let resource = self.settings.resource_url.as_str().trim_end_matches('/');
        format!("{resource}/api/data/{API_VERSION}")
    }

    fn decorate(builder: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        builder
            .bearer_auth(token.expose_secret())
            .header("OData-MaxVersion", ODATA_VERSION)
            .header("OData-Version", ODATA_VERSION)
            .header(header::ACCEPT, "application/json")
            .header("Prefer", FORMATTED_VALUES)
    }

    async fn get_json<D>(&self, operation: &'static str, url: &str) -> BusinessStoreResult<D>
    where
        D: DeserializeOwned,
    {
        let token = self.tokens.business_token().await?;
        let response = Self::decorate(self.client.get(url), &token)
            .send()
            .await
            .map_err(BusinessStoreError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BusinessStoreError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }
        response
            .json::<D>()
            .await
            .map_err(|err| BusinessStoreError::MalformedResponse {
                operation,
                detail: err.to_string(),
            })
    }

    async fn send_patch(
        &self,
        operation: &'static str,
        url: &str,
        payload: &(impl Serialize + Sync),
    ) -> BusinessStoreResult<()> {
        let token = self.tokens.business_token().await?;
        let response = Self::decorate(self.client.patch(url), &token)
            .json(payload)
            .send()
            .await
            .map_err(BusinessStoreError::transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BusinessStoreError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            })
        }
    }

    async fn post_entity(
        &self,
        operation: &'static str,
        url: &str,
        payload: &(impl Serialize + Sync),
    ) -> BusinessStoreResult<Uuid> {
        let token = self.tokens.business_token().await?;
        let response = Self::decorate(self.client.post(url), &token)
            .json(payload)
            .send()
            .await
            .map_err(BusinessStoreError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(BusinessStoreError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }
        let entity_header = response
            .headers()
            .get("OData-EntityId")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        models::entity_id_from_header(entity_header).ok_or_else(|| {
            BusinessStoreError::MalformedResponse {
                operation,
                detail: format!("no entity identifier in header {entity_header:?}"),
            }
        })
    }
}

#[async_trait]
impl<T: TokenProvider> BusinessStore for DataverseBusinessStore<T> {
    async fn fetch_open_tasks(&self, limit: usize) -> BusinessStoreResult<Vec<BusinessTask>> {
        let url = format!(
            "{base}/tasks?$filter=statecode eq 0&$select={TASK_COLUMNS}&$top={limit}&$orderby=scheduledend asc",
            base = self.api_base()
        );
        let page: QueryPage<TaskRow> = self.get_json("fetch open tasks", &url).await?;
        debug!(count = page.value.len(), "fetched open business tasks");
        Ok(page.value.into_iter().map(models::business_task_from).collect())
    }

    async fn fetch_wbs_tasks(
        &self,
        project: ProjectId,
    ) -> BusinessStoreResult<Vec<BusinessWbsTask>> {
        let url = format!(
            "{base}/msdyn_projecttasks?$filter=_msdyn_project_value eq '{project}'&$select={WBS_COLUMNS}&$orderby=msdyn_scheduledstart asc&$top={WBS_QUERY_LIMIT}",
            base = self.api_base()
        );
        let page: QueryPage<WbsRow> = self.get_json("fetch project tasks", &url).await?;
        debug!(count = page.value.len(), %project, "fetched business project tasks");
        Ok(page.value.into_iter().map(models::wbs_task_from).collect())
    }

    async fn create_task(&self, draft: &BusinessTaskDraft) -> BusinessStoreResult<ActivityId> {
        let url = format!("{base}/tasks", base = self.api_base());
        let payload = NewTaskPayload::from_draft(draft);
        let id = self.post_entity("create task", &url, &payload).await?;
        let activity = ActivityId::from_uuid(id);
        debug!(subject = draft.subject(), %activity, "created business task");
        Ok(activity)
    }

    async fn complete_task(
        &self,
        activity: ActivityId,
        completed_on: DateTime<Utc>,
    ) -> BusinessStoreResult<()> {
        let url = format!("{base}/tasks({activity})", base = self.api_base());
        let payload = CompleteTaskPayload::new(completed_on);
        self.send_patch("complete task", &url, &payload).await?;
        debug!(%activity, "completed business task");
        Ok(())
    }

    async fn create_wbs_task(&self, draft: &WbsTaskDraft) -> BusinessStoreResult<ProjectTaskId> {
        let url = format!("{base}/msdyn_projecttasks", base = self.api_base());
        let payload = NewWbsTaskPayload::from_draft(draft);
        let id = self
            .post_entity("create project task", &url, &payload)
            .await?;
        let project_task = ProjectTaskId::from_uuid(id);
        debug!(subject = draft.subject(), %project_task, "created business project task");
        Ok(project_task)
    }

    async fn update_wbs_progress(
        &self,
        project_task: ProjectTaskId,
        progress: Progress,
        complete: bool,
    ) -> BusinessStoreResult<()> {
        let url = format!(
            "{base}/msdyn_projecttasks({project_task})",
            base = self.api_base()
        );
        let payload = WbsProgressPayload::new(progress, complete);
        self.send_patch("update project task progress", &url, &payload)
            .await?;
        debug!(%project_task, %progress, complete, "updated business project task");
        Ok(())
    }

    async fn find_task_by_subject(
        &self,
        subject: &str,
    ) -> BusinessStoreResult<Option<BusinessTaskRef>> {
        let literal = models::odata_literal(subject);
        let url = format!(
            "{base}/tasks?$filter=subject eq '{literal}'&$select=activityid,statecode&$top=1",
            base = self.api_base()
        );
        let page: QueryPage<TaskRefRow> = self.get_json("find task by subject", &url).await?;
        Ok(page.value.into_iter().next().map(models::task_ref_from))
    }
}
