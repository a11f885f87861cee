//! The bootstrap snapshot handed to the embedded widget runtime.
//!
//! The snapshot is the only thing the page embed sees at load time: the
//! runtime uses it to fetch configuration (compact form), create a
//! conversation, and persist messages on its own. Everything in it is
//! public; the builder's inputs cannot hold a private credential.

use chrono::Utc;
use serde::Serialize;

use crate::core::config::{BotConfig, DepartmentBot, Endpoints, IntegrationConfig, WidgetPosition};
use crate::core::constants::WIDGET_SCRIPT_PATH;
use crate::core::error::EngineError;
use crate::core::notice::{Notice, Notices};
use crate::utils::url::{construct_api_url, with_version_param};

/// Which of the two snapshot shapes to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotForm {
    /// References the integration by id; the runtime fetches the rest.
    Compact,
    /// Fully inlined fields for embed scripts predating the id-based
    /// fetch flow.
    Legacy,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentChoice {
    pub name: String,
    pub label: String,
}

impl From<&DepartmentBot> for DepartmentChoice {
    fn from(entry: &DepartmentBot) -> Self {
        Self {
            name: entry.department_name.clone(),
            label: entry.department_label.clone(),
        }
    }
}

/// Inlined configuration carried only by the legacy form.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFields {
    pub bot_name: String,
    pub theme: String,
    pub brand_color: String,
    pub position: WidgetPosition,
    pub welcome_message: String,
    pub collect_leads: bool,
    pub departments: Vec<DepartmentChoice>,
}

/// The immutable, JSON-serializable bootstrap object. Field order is the
/// serialization order; with identical inputs and an identical version
/// parameter the JSON is byte-identical.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    pub api_base_url: String,
    pub stream_url: String,
    pub script_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyFields>,
}

/// Build a snapshot with the current timestamp as the cache-busting
/// version parameter on the script URL.
pub fn build(
    bot: &BotConfig,
    integration: &IntegrationConfig,
    departments: &[DepartmentBot],
    endpoints: &Endpoints,
    form: SnapshotForm,
    notices: &dyn Notices,
) -> Result<WidgetSnapshot, EngineError> {
    let version = Utc::now().timestamp_millis().to_string();
    build_with_version(bot, integration, departments, endpoints, form, &version, notices)
}

/// Deterministic variant: the caller supplies the version parameter.
pub fn build_with_version(
    bot: &BotConfig,
    integration: &IntegrationConfig,
    departments: &[DepartmentBot],
    endpoints: &Endpoints,
    form: SnapshotForm,
    version: &str,
    notices: &dyn Notices,
) -> Result<WidgetSnapshot, EngineError> {
    let endpoints = endpoints.clone().validated()?;

    let public_key = integration
        .public_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);
    if public_key.is_none() {
        notices.notify(Notice::warning(
            "Configuration",
            format!(
                "integration '{}' has no public key; the embedded widget will not be able to fetch configuration or persist messages",
                integration.id
            ),
        ));
    }

    let script_url = with_version_param(
        &construct_api_url(&endpoints.script_base_url, WIDGET_SCRIPT_PATH),
        version,
    );

    let (integration_id, legacy) = match form {
        SnapshotForm::Compact => (Some(integration.id.clone()), None),
        SnapshotForm::Legacy => (
            None,
            Some(LegacyFields {
                bot_name: bot.name.clone(),
                theme: integration.theme.clone(),
                brand_color: integration.brand_color.clone(),
                position: integration.position,
                welcome_message: integration.welcome_message.clone(),
                collect_leads: integration.collect_leads,
                departments: departments.iter().map(DepartmentChoice::from).collect(),
            }),
        ),
    };

    Ok(WidgetSnapshot {
        api_base_url: endpoints.api_base_url.clone(),
        stream_url: endpoints.stream_url(),
        script_url,
        public_key,
        integration_id,
        legacy,
    })
}
