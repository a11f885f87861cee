//! Configuration read access.
//!
//! The hosted database behind the dashboard is a collaborator; the engine
//! only needs four eventually-consistent reads. No transactional guarantee
//! is assumed anywhere.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::config::{Action, BotConfig, DepartmentBot, IntegrationConfig};
use crate::core::error::EngineError;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_bot_by_id(&self, bot_id: &str) -> Result<Option<BotConfig>, EngineError>;

    async fn get_actions_for_bot(&self, bot_id: &str) -> Result<Vec<Action>, EngineError>;

    async fn get_integration_by_id(
        &self,
        integration_id: &str,
    ) -> Result<Option<IntegrationConfig>, EngineError>;

    async fn get_department_bots(
        &self,
        integration_id: &str,
    ) -> Result<Vec<DepartmentBot>, EngineError>;
}

/// Map-backed store for tests and single-process playground hosts.
#[derive(Default)]
pub struct InMemoryConfigStore {
    bots: HashMap<String, BotConfig>,
    integrations: HashMap<String, IntegrationConfig>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot(mut self, bot: BotConfig) -> Self {
        self.bots.insert(bot.id.clone(), bot);
        self
    }

    pub fn with_integration(mut self, integration: IntegrationConfig) -> Self {
        self.integrations.insert(integration.id.clone(), integration);
        self
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_bot_by_id(&self, bot_id: &str) -> Result<Option<BotConfig>, EngineError> {
        Ok(self.bots.get(bot_id).cloned())
    }

    async fn get_actions_for_bot(&self, bot_id: &str) -> Result<Vec<Action>, EngineError> {
        Ok(self
            .bots
            .get(bot_id)
            .map(|bot| bot.actions.clone())
            .unwrap_or_default())
    }

    async fn get_integration_by_id(
        &self,
        integration_id: &str,
    ) -> Result<Option<IntegrationConfig>, EngineError> {
        Ok(self.integrations.get(integration_id).cloned())
    }

    async fn get_department_bots(
        &self,
        integration_id: &str,
    ) -> Result<Vec<DepartmentBot>, EngineError> {
        Ok(self
            .integrations
            .get(integration_id)
            .map(|integration| integration.department_bots.clone())
            .unwrap_or_default())
    }
}
