use tracing::debug;

use super::{Engine, EngineAction, EngineCommand};
use crate::core::department::DepartmentRequest;
use crate::core::notice::Notice;

pub(super) fn handle_department_action(
    engine: &mut Engine,
    action: EngineAction,
) -> Option<EngineCommand> {
    match action {
        EngineAction::SwitchDepartment { department } => switch_department(engine, department),
        EngineAction::DepartmentLoaded { department, bot } => {
            if engine.pending_department.as_deref() != Some(department.as_str()) {
                debug!(department, "stale department load, ignoring");
                return None;
            }
            engine.pending_department = None;
            engine.adopt_bot(bot, Some(department));
            None
        }
        EngineAction::DepartmentLoadFailed { department, error } => {
            if engine.pending_department.as_deref() != Some(department.as_str()) {
                debug!(department, "stale department load failure, ignoring");
                return None;
            }
            engine.pending_department = None;
            Some(EngineCommand::Notify(Notice::error(
                "Department",
                format!("Could not switch to department '{department}': {error}"),
            )))
        }
        _ => unreachable!("non-department action routed to department handler"),
    }
}

/// Begin a department switch: the in-flight turn is cancelled and its
/// partial placeholder discarded (the transcript is about to be replaced
/// by the new bot's greeting), then the host is asked to load the bot.
fn switch_department(engine: &mut Engine, department: String) -> Option<EngineCommand> {
    if !engine.departments.is_enabled() {
        debug!(department, "department selection not available");
        return Some(EngineCommand::Notify(Notice::warning(
            "Department",
            "Department selection is not available for this widget.",
        )));
    }

    let entry = match engine.departments.resolve(&department) {
        Some(entry) => entry.clone(),
        None => {
            return Some(EngineCommand::Notify(Notice::warning(
                "Department",
                format!("Unknown department '{department}'."),
            )));
        }
    };

    engine.cancel_current_stream();
    engine.history.discard_placeholder();
    engine.pending_department = Some(entry.department_name.clone());

    Some(EngineCommand::LoadDepartment(DepartmentRequest {
        department: entry.department_name,
        bot_id: entry.bot_id,
    }))
}
