//! Department routing: which bot configuration serves a visitor.

use tracing::debug;

use crate::core::config::{DepartmentBot, IntegrationConfig};
use crate::core::error::EngineError;
use crate::core::plan::PlanGate;
use crate::core::store::ConfigStore;

/// The routing table exposed to a visitor, built once per session from the
/// owning integration and the plan capability gate. When the plan forbids
/// multiple departments the directory is empty and selection is never
/// offered; only the integration's default bot is reachable.
#[derive(Debug, Clone, Default)]
pub struct DepartmentDirectory {
    entries: Vec<DepartmentBot>,
}

impl DepartmentDirectory {
    pub fn from_integration(integration: &IntegrationConfig, gate: &dyn PlanGate) -> Self {
        if !gate.multi_department_enabled() {
            debug!(
                integration = %integration.id,
                "plan forbids departments, exposing default bot only"
            );
            return Self::default();
        }
        Self {
            entries: integration.department_bots.clone(),
        }
    }

    /// Whether the host surface should offer department selection at all.
    pub fn is_enabled(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DepartmentBot] {
        &self.entries
    }

    /// Resolve a visitor-selected department name to its routing entry.
    ///
    /// Names are compared case-insensitively. When the list carries
    /// duplicate names, the first entry in list order wins; duplicates are
    /// not rejected at load time.
    pub fn resolve(&self, department_name: &str) -> Option<&DepartmentBot> {
        self.entries
            .iter()
            .find(|entry| entry.department_name.eq_ignore_ascii_case(department_name))
    }
}

/// A department switch in flight: the engine emits this as a command, the
/// host loads the bot through the config store and feeds the result back
/// as an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRequest {
    pub department: String,
    pub bot_id: String,
}

/// Fetch and validate the bot configuration behind a department request.
pub async fn load_department_bot(
    store: &dyn ConfigStore,
    request: &DepartmentRequest,
) -> Result<crate::core::config::BotConfig, EngineError> {
    let bot = store
        .get_bot_by_id(&request.bot_id)
        .await?
        .ok_or_else(|| {
            EngineError::Resolution(format!(
                "department '{}' references unknown bot '{}'",
                request.department, request.bot_id
            ))
        })?;
    bot.validated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::plan::StaticPlanGate;
    use crate::core::store::InMemoryConfigStore;
    use crate::utils::test_utils::{test_bot, test_integration};

    fn department(name: &str, bot_id: &str) -> DepartmentBot {
        DepartmentBot {
            department_name: name.to_string(),
            department_label: name.to_string(),
            bot_id: bot_id.to_string(),
        }
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let mut integration = test_integration("int-1");
        integration.department_bots = vec![department("sales", "bot-sales")];

        let directory = DepartmentDirectory::from_integration(
            &integration,
            &StaticPlanGate::allowing_departments(),
        );
        assert!(directory.is_enabled());
        assert_eq!(
            directory.resolve("SALES").map(|d| d.bot_id.as_str()),
            Some("bot-sales")
        );
        assert!(directory.resolve("support").is_none());
    }

    #[test]
    fn duplicate_names_resolve_to_first_entry_in_list_order() {
        let mut integration = test_integration("int-1");
        integration.department_bots = vec![
            department("sales", "bot-first"),
            department("Sales", "bot-second"),
        ];

        let directory = DepartmentDirectory::from_integration(
            &integration,
            &StaticPlanGate::allowing_departments(),
        );
        assert_eq!(
            directory.resolve("sales").map(|d| d.bot_id.as_str()),
            Some("bot-first")
        );
    }

    #[test]
    fn plan_gate_hides_departments_entirely() {
        let mut integration = test_integration("int-1");
        integration.department_bots = vec![department("sales", "bot-sales")];

        let directory =
            DepartmentDirectory::from_integration(&integration, &StaticPlanGate::single_bot_only());
        assert!(!directory.is_enabled());
        assert!(directory.entries().is_empty());
        assert!(directory.resolve("sales").is_none());
    }

    #[tokio::test]
    async fn load_department_bot_fetches_and_validates() {
        let store = InMemoryConfigStore::new().with_bot(test_bot("bot-sales"));
        let request = DepartmentRequest {
            department: "sales".to_string(),
            bot_id: "bot-sales".to_string(),
        };

        let bot = load_department_bot(&store, &request).await.expect("bot");
        assert_eq!(bot.id, "bot-sales");
    }

    #[tokio::test]
    async fn load_department_bot_reports_unknown_bots() {
        let store = InMemoryConfigStore::new();
        let request = DepartmentRequest {
            department: "sales".to_string(),
            bot_id: "bot-missing".to_string(),
        };

        let err = load_department_bot(&store, &request)
            .await
            .expect_err("missing bot");
        assert!(matches!(err, EngineError::Resolution(_)));
    }
}
