//! HTTP client for the collaboration store's list API.

use super::models::{self, ChecklistFields, ListItem, ListPage, ListResource, SiteResource, WbsFields};
use crate::sync::domain::{
    ActivityId, ChecklistItem, ChecklistStatus, ListItemId, Progress, ProjectTaskId, WbsItem,
};
use crate::sync::ports::{
    CollaborationStore, CollaborationStoreError, CollaborationStoreResult, TokenProvider,
};
use async_trait::async_trait;
use reqwest::{Client, Url, header};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::debug;

/// Default service root for the collaboration store API.
pub const DEFAULT_GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Default display name of the checklist list.
pub const DEFAULT_CHECKLIST_LIST: &str = "To Dos";

/// Default display name of the WBS list.
pub const DEFAULT_WBS_LIST: &str = "WBS Tasks";

/// Columns selected from the checklist list.
const CHECKLIST_COLUMNS: &str = "Title,Status,DueDate,AssignedTo,Priority,Notes,D365TaskId";

/// Columns selected from the WBS list.
const WBS_COLUMNS: &str =
    "Title,Phase,TaskCode,StartDate,DueDate,Status,PercentComplete,Dependencies,D365ProjectTaskId";

/// Connection settings for the collaboration store.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    site_url: Url,
    graph_base: String,
    checklist_list: String,
    wbs_list: String,
}

impl GraphSettings {
    /// Creates settings for one site with the default service root and
    /// list names.
    #[must_use]
    pub fn new(site_url: Url) -> Self {
        Self {
            site_url,
            graph_base: DEFAULT_GRAPH_BASE.to_owned(),
            checklist_list: DEFAULT_CHECKLIST_LIST.to_owned(),
            wbs_list: DEFAULT_WBS_LIST.to_owned(),
        }
    }

    /// Overrides the service root URL.
    #[must_use]
    pub fn with_graph_base(mut self, base: impl Into<String>) -> Self {
        self.graph_base = base.into();
        self
    }

    /// Overrides the checklist list display name.
    #[must_use]
    pub fn with_checklist_list(mut self, name: impl Into<String>) -> Self {
        self.checklist_list = name.into();
        self
    }

    /// Overrides the WBS list display name.
    #[must_use]
    pub fn with_wbs_list(mut self, name: impl Into<String>) -> Self {
        self.wbs_list = name.into();
        self
    }

    /// Returns the site URL.
    #[must_use]
    pub const fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Returns the service root URL.
    #[must_use]
    pub fn graph_base(&self) -> &str {
        &self.graph_base
    }

    /// Returns the checklist list display name.
    #[must_use]
    pub fn checklist_list(&self) -> &str {
        &self.checklist_list
    }

    /// Returns the WBS list display name.
    #[must_use]
    pub fn wbs_list(&self) -> &str {
        &self.wbs_list
    }
}

/// Collaboration store backed by the hosted list API.
///
/// The site identifier is resolved from the site URL on first use and
/// cached for the life of the store, as are list identifiers keyed by
/// display name. Reads follow continuation links until the full result
/// set is collected; writes patch individual item columns.
pub struct GraphCollaborationStore<T> {
    client: Client,
    settings: GraphSettings,
    tokens: Arc<T>,
    site_id: OnceCell<String>,
    list_ids: RwLock<HashMap<String, String>>,
}

impl<T: TokenProvider> GraphCollaborationStore<T> {
    /// Creates a store over the given settings and token issuer.
    #[must_use]
    pub fn new(settings: GraphSettings, tokens: Arc<T>) -> Self {
        Self {
            client: Client::new(),
            settings,
            tokens,
            site_id: OnceCell::new(),
            list_ids: RwLock::new(HashMap::new()),
        }
    }

    fn base(&self) -> &str {
        self.settings.graph_base.trim_end_matches('/')
    }

    async fn get_json<D>(&self, operation: &'static str, url: &str) -> CollaborationStoreResult<D>
    where
        D: DeserializeOwned,
    {
        let token = self.tokens.collaboration_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(CollaborationStoreError::transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaborationStoreError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            });
        }
        response
            .json::<D>()
            .await
            .map_err(|err| CollaborationStoreError::MalformedResponse {
                operation,
                detail: err.to_string(),
            })
    }

    async fn patch_fields(
        &self,
        operation: &'static str,
        url: &str,
        payload: &Value,
    ) -> CollaborationStoreResult<()> {
        let token = self.tokens.collaboration_token().await?;
        let response = self
            .client
            .patch(url)
            .bearer_auth(token.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(CollaborationStoreError::transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CollaborationStoreError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            })
        }
    }

    async fn site_base(&self) -> CollaborationStoreResult<String> {
        let site_id = self
            .site_id
            .get_or_try_init(|| self.resolve_site_id())
            .await?;
        Ok(format!("{}/sites/{site_id}", self.base()))
    }

    async fn resolve_site_id(&self) -> CollaborationStoreResult<String> {
        let host = self.settings.site_url.host_str().unwrap_or_default();
        let path = self.settings.site_url.path().trim_start_matches('/');
        let url = format!("{}/sites/{host}:/{path}", self.base());
        let site: SiteResource = self.get_json("resolve site", &url).await?;
        debug!(site_id = %site.id, "resolved collaboration site");
        Ok(site.id)
    }

    async fn list_id(&self, display_name: &str) -> CollaborationStoreResult<String> {
        if let Some(cached) = self.list_ids.read().await.get(display_name) {
            return Ok(cached.clone());
        }
        let site = self.site_base().await?;
        let url = format!("{site}/lists/{display_name}");
        let list: ListResource = self.get_json("resolve list", &url).await?;
        debug!(list = display_name, list_id = %list.id, "resolved list");
        self.list_ids
            .write()
            .await
            .insert(display_name.to_owned(), list.id.clone());
        Ok(list.id)
    }

    async fn item_fields_url(
        &self,
        list_name: &str,
        id: &ListItemId,
    ) -> CollaborationStoreResult<String> {
        let site = self.site_base().await?;
        let list_id = self.list_id(list_name).await?;
        Ok(format!("{site}/lists/{list_id}/items/{id}/fields"))
    }

    async fn fetch_items<F>(
        &self,
        operation: &'static str,
        list_name: &str,
        columns: &str,
    ) -> CollaborationStoreResult<Vec<ListItem<F>>>
    where
        F: DeserializeOwned + Default,
    {
        let site = self.site_base().await?;
        let list_id = self.list_id(list_name).await?;
        let first = format!("{site}/lists/{list_id}/items?$expand=fields($select={columns})");
        let mut items = Vec::new();
        let mut next = Some(first);
        while let Some(url) = next {
            let page: ListPage<F> = self.get_json(operation, &url).await?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }
}

#[async_trait]
impl<T: TokenProvider> CollaborationStore for GraphCollaborationStore<T> {
    async fn fetch_checklist(&self) -> CollaborationStoreResult<Vec<ChecklistItem>> {
        let entries = self
            .fetch_items::<ChecklistFields>(
                "fetch checklist",
                self.settings.checklist_list(),
                CHECKLIST_COLUMNS,
            )
            .await?;
        debug!(count = entries.len(), "fetched checklist items");
        Ok(entries.into_iter().map(models::checklist_item_from).collect())
    }

    async fn fetch_wbs(&self) -> CollaborationStoreResult<Vec<WbsItem>> {
        let entries = self
            .fetch_items::<WbsFields>("fetch WBS items", self.settings.wbs_list(), WBS_COLUMNS)
            .await?;
        debug!(count = entries.len(), "fetched WBS items");
        Ok(entries.into_iter().map(models::wbs_item_from).collect())
    }

    async fn update_status(
        &self,
        id: &ListItemId,
        status: ChecklistStatus,
    ) -> CollaborationStoreResult<()> {
        let url = self
            .item_fields_url(self.settings.checklist_list(), id)
            .await?;
        let payload = json!({ "Status": status.as_str() });
        self.patch_fields("update checklist status", &url, &payload)
            .await?;
        debug!(item = %id, %status, "updated checklist status");
        Ok(())
    }

    async fn link_business_task(
        &self,
        id: &ListItemId,
        activity: ActivityId,
    ) -> CollaborationStoreResult<()> {
        let url = self
            .item_fields_url(self.settings.checklist_list(), id)
            .await?;
        let payload = json!({ "D365TaskId": activity.to_string() });
        self.patch_fields("link checklist item", &url, &payload)
            .await?;
        debug!(item = %id, %activity, "linked checklist item");
        Ok(())
    }

    async fn update_wbs_progress(
        &self,
        id: &ListItemId,
        progress: Progress,
        status: Option<ChecklistStatus>,
        project_task: ProjectTaskId,
    ) -> CollaborationStoreResult<()> {
        let url = self.item_fields_url(self.settings.wbs_list(), id).await?;
        let mut payload = serde_json::Map::new();
        payload.insert("PercentComplete".to_owned(), json!(progress.value()));
        if let Some(label) = status {
            payload.insert("Status".to_owned(), json!(label.as_str()));
        }
        payload.insert(
            "D365ProjectTaskId".to_owned(),
            json!(project_task.to_string()),
        );
        self.patch_fields("update WBS progress", &url, &Value::Object(payload))
            .await?;
        debug!(item = %id, %progress, "updated WBS item");
        Ok(())
    }
}
