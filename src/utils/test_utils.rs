//! Shared builders for the test suite.

use crate::core::app::{Engine, SessionContext};
use crate::core::config::{
    Action, ActionKind, BotConfig, DepartmentBot, Endpoints, IntegrationConfig, WidgetPosition,
};
use crate::core::department::DepartmentDirectory;
use crate::core::plan::StaticPlanGate;

pub fn test_action(id: &str, kind: ActionKind) -> Action {
    let payload = match kind {
        ActionKind::Link => "https://example.com/docs",
        ActionKind::Phone => "+4915112345678",
        ActionKind::Whatsapp => "https://wa.me/4915112345678",
        ActionKind::Handoff => "support-queue",
    };
    Action {
        id: id.to_string(),
        kind,
        label: format!("Action {id}"),
        payload: payload.to_string(),
        trigger_message: None,
    }
}

pub fn test_bot(id: &str) -> BotConfig {
    BotConfig {
        id: id.to_string(),
        name: "Test Bot".to_string(),
        model: "prism-2-small".to_string(),
        provider: "prism".to_string(),
        temperature: 0.7,
        system_instruction: String::new(),
        knowledge_base: String::new(),
        greeting: "Hello from the test bot!".to_string(),
        actions: Vec::new(),
        department_bots: Vec::new(),
    }
}

pub fn test_integration(id: &str) -> IntegrationConfig {
    IntegrationConfig {
        id: id.to_string(),
        theme: "light".to_string(),
        brand_color: "#6633ee".to_string(),
        position: WidgetPosition::BottomRight,
        welcome_message: "Welcome!".to_string(),
        collect_leads: true,
        default_bot_id: "bot-default".to_string(),
        department_bots: Vec::new(),
        public_key: Some("pub-key-123".to_string()),
    }
}

pub fn test_endpoints() -> Endpoints {
    Endpoints {
        api_base_url: "https://api.example.com/v1".to_string(),
        script_base_url: "https://cdn.example.com".to_string(),
    }
}

fn test_bot_with_actions() -> BotConfig {
    let mut bot = test_bot("bot-default");
    let mut whatsapp = test_action("wa-1", ActionKind::Whatsapp);
    whatsapp.trigger_message = Some("Opening WhatsApp...".to_string());
    bot.actions = vec![whatsapp, test_action("call-1", ActionKind::Phone)];
    bot
}

/// Engine with a default bot (two actions, no departments).
pub fn test_engine() -> Engine {
    let session = SessionContext::new(
        test_endpoints(),
        "pub-key-123".to_string(),
        test_bot_with_actions(),
    );
    Engine::new(session, DepartmentDirectory::default())
}

/// Engine whose integration routes to sales and support departments.
pub fn test_engine_with_departments() -> Engine {
    let mut integration = test_integration("int-1");
    integration.department_bots = vec![
        DepartmentBot {
            department_name: "sales".to_string(),
            department_label: "Sales".to_string(),
            bot_id: "bot-sales".to_string(),
        },
        DepartmentBot {
            department_name: "support".to_string(),
            department_label: "Support".to_string(),
            bot_id: "bot-support".to_string(),
        },
    ];
    let directory = DepartmentDirectory::from_integration(
        &integration,
        &StaticPlanGate::allowing_departments(),
    );
    let session = SessionContext::new(
        test_endpoints(),
        "pub-key-123".to_string(),
        test_bot_with_actions(),
    );
    Engine::new(session, directory)
}
