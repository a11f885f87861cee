//! Bot and integration configuration.
//!
//! Configuration is loaded once per session through the config-store
//! collaborator and treated as an immutable snapshot from then on: a
//! department switch replaces the whole [`BotConfig`], it never mutates
//! one in place. Edits made elsewhere do not reach a running session.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::error::EngineError;

/// The side-effect family an [`Action`] triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Link,
    Phone,
    Whatsapp,
    Handoff,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Link => "link",
            ActionKind::Phone => "phone",
            ActionKind::Whatsapp => "whatsapp",
            ActionKind::Handoff => "handoff",
        }
    }
}

/// A configured, model-triggerable side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub kind: ActionKind,
    pub label: String,
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_message: Option<String>,
}

impl Action {
    /// Check that the payload matches the action kind: digit strings for
    /// phone numbers, absolute URLs for link and WhatsApp targets. Handoff
    /// actions carry free-form payloads.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::Config(
                "action id must not be empty".to_string(),
            ));
        }
        match self.kind {
            ActionKind::Phone => {
                let digits = self.payload.strip_prefix('+').unwrap_or(&self.payload);
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(EngineError::Config(format!(
                        "action '{}': phone payload must be digits, got '{}'",
                        self.id, self.payload
                    )));
                }
            }
            ActionKind::Link | ActionKind::Whatsapp => {
                Url::parse(&self.payload).map_err(|err| {
                    EngineError::Config(format!(
                        "action '{}': payload is not an absolute URL: {err}",
                        self.id
                    ))
                })?;
            }
            ActionKind::Handoff => {}
        }
        Ok(())
    }
}

/// One named routing target inside a widget integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentBot {
    pub department_name: String,
    pub department_label: String,
    pub bot_id: String,
}

impl DepartmentBot {
    /// Department names travel in widget URLs; restrict them to slug
    /// characters.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.department_name.is_empty()
            || !self
                .department_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(EngineError::Config(format!(
                "department name '{}' is not a URL-safe slug",
                self.department_name
            )));
        }
        Ok(())
    }
}

/// Immutable per-session description of one conversational agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    pub provider: String,
    pub temperature: f32,
    #[serde(default)]
    pub system_instruction: String,
    #[serde(default)]
    pub knowledge_base: String,
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub department_bots: Vec<DepartmentBot>,
}

impl BotConfig {
    /// Validate a freshly loaded config and clamp the sampling temperature
    /// into the supported 0.0..=2.0 range.
    pub fn validated(mut self) -> Result<Self, EngineError> {
        self.temperature = self.temperature.clamp(0.0, 2.0);
        for action in &self.actions {
            action.validate()?;
        }
        for (index, action) in self.actions.iter().enumerate() {
            if self.actions[..index]
                .iter()
                .any(|other| other.id == action.id)
            {
                return Err(EngineError::Config(format!(
                    "bot '{}': duplicate action id '{}'",
                    self.id, action.id
                )));
            }
        }
        for department in &self.department_bots {
            department.validate()?;
        }
        Ok(self)
    }

    pub fn action_by_id(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }
}

/// Corner of the page the widget launcher docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    BottomRight,
    BottomLeft,
}

/// One embedded deployment of the widget: appearance, lead collection, the
/// default bot, and the department routing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub id: String,
    pub theme: String,
    pub brand_color: String,
    pub position: WidgetPosition,
    pub welcome_message: String,
    pub collect_leads: bool,
    pub default_bot_id: String,
    #[serde(default)]
    pub department_bots: Vec<DepartmentBot>,
    /// Public site credential the embedded runtime uses for configuration
    /// fetch and message persistence. Never a private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// Environment base URLs the engine and snapshot builder work against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub api_base_url: String,
    pub script_base_url: String,
}

impl Endpoints {
    pub fn validated(self) -> Result<Self, EngineError> {
        for (label, value) in [
            ("api_base_url", &self.api_base_url),
            ("script_base_url", &self.script_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(EngineError::Config(format!("{label} is not set")));
            }
            Url::parse(value)
                .map_err(|err| EngineError::Config(format!("{label} is not a valid URL: {err}")))?;
        }
        Ok(self)
    }

    /// Absolute URL of the streaming endpoint.
    pub fn stream_url(&self) -> String {
        crate::utils::url::construct_api_url(
            &self.api_base_url,
            crate::core::constants::STREAM_ENDPOINT,
        )
    }
}
