//! Environment-driven settings for the reconciliation binary.
//!
//! Settings are read through a lookup function so tests can supply maps
//! instead of mutating process state. Empty values count as unset, both
//! for required variables and for optional overrides.

use crate::sync::adapters::dataverse::DataverseSettings;
use crate::sync::adapters::graph::GraphSettings;
use crate::sync::adapters::identity::IdentitySettings;
use crate::sync::domain::ProjectId;
use crate::sync::services::SyncScope;
use reqwest::Url;
use secrecy::SecretString;
use thiserror::Error;
use uuid::Uuid;

/// Result type for settings loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

const SITE_URL_VAR: &str = "SHAREPOINT_SITE_URL";
const CHECKLIST_LIST_VAR: &str = "SP_TODO_LIST_NAME";
const WBS_LIST_VAR: &str = "SP_WBS_LIST_NAME";
const BUSINESS_RESOURCE_VAR: &str = "D365_RESOURCE_URL";
const PROJECT_ID_VAR: &str = "D365_PROJECT_ID";
const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";
const OPEN_TASK_LIMIT_VAR: &str = "SYNC_OPEN_TASK_LIMIT";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    /// A variable's value failed URL parsing.
    #[error("environment variable {name} holds an invalid URL: {detail}")]
    InvalidUrl {
        /// Variable at fault.
        name: &'static str,
        /// Parser diagnostic.
        detail: String,
    },

    /// A variable's value failed GUID parsing.
    #[error("environment variable {name} holds an invalid GUID: {detail}")]
    InvalidGuid {
        /// Variable at fault.
        name: &'static str,
        /// Parser diagnostic.
        detail: String,
    },

    /// A variable's value failed numeric parsing.
    #[error("environment variable {name} holds an invalid number: {detail}")]
    InvalidNumber {
        /// Variable at fault.
        name: &'static str,
        /// Parser diagnostic.
        detail: String,
    },
}

/// Settings for one reconciliation process.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    graph: GraphSettings,
    dataverse: DataverseSettings,
    identity: IdentitySettings,
    scope: SyncScope,
}

impl SyncSettings {
    /// Reads settings from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a
    /// value fails to parse.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through the given variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent or a
    /// value fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let site_url = parse_url(SITE_URL_VAR, &require(&lookup, SITE_URL_VAR)?)?;
        let mut graph = GraphSettings::new(site_url);
        if let Some(name) = optional(&lookup, CHECKLIST_LIST_VAR) {
            graph = graph.with_checklist_list(name);
        }
        if let Some(name) = optional(&lookup, WBS_LIST_VAR) {
            graph = graph.with_wbs_list(name);
        }

        let business_resource =
            parse_url(BUSINESS_RESOURCE_VAR, &require(&lookup, BUSINESS_RESOURCE_VAR)?)?;
        let identity = IdentitySettings::new(
            require(&lookup, TENANT_ID_VAR)?,
            require(&lookup, CLIENT_ID_VAR)?,
            SecretString::from(require(&lookup, CLIENT_SECRET_VAR)?),
            &business_resource,
        );
        let dataverse = DataverseSettings::new(business_resource);

        let mut scope = SyncScope::new();
        if let Some(raw) = optional(&lookup, PROJECT_ID_VAR) {
            scope = scope.with_project(parse_project(PROJECT_ID_VAR, &raw)?);
        }
        if let Some(raw) = optional(&lookup, OPEN_TASK_LIMIT_VAR) {
            scope = scope.with_open_task_limit(parse_limit(OPEN_TASK_LIMIT_VAR, &raw)?);
        }

        Ok(Self {
            graph,
            dataverse,
            identity,
            scope,
        })
    }

    /// Returns the collaboration store settings.
    #[must_use]
    pub const fn graph(&self) -> &GraphSettings {
        &self.graph
    }

    /// Returns the business store settings.
    #[must_use]
    pub const fn dataverse(&self) -> &DataverseSettings {
        &self.dataverse
    }

    /// Returns the token provider settings.
    #[must_use]
    pub const fn identity(&self) -> &IdentitySettings {
        &self.identity
    }

    /// Returns the run scope.
    #[must_use]
    pub const fn scope(&self) -> SyncScope {
        self.scope
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> ConfigResult<String> {
    optional(lookup, name).ok_or(ConfigError::MissingVar(name))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|value| !value.is_empty())
}

fn parse_url(name: &'static str, raw: &str) -> ConfigResult<Url> {
    Url::parse(raw).map_err(|err| ConfigError::InvalidUrl {
        name,
        detail: err.to_string(),
    })
}

fn parse_project(name: &'static str, raw: &str) -> ConfigResult<ProjectId> {
    Uuid::parse_str(raw)
        .map(ProjectId::from_uuid)
        .map_err(|err| ConfigError::InvalidGuid {
            name,
            detail: err.to_string(),
        })
}

fn parse_limit(name: &'static str, raw: &str) -> ConfigResult<usize> {
    raw.parse()
        .map_err(|err: std::num::ParseIntError| ConfigError::InvalidNumber {
            name,
            detail: err.to_string(),
        })
}
