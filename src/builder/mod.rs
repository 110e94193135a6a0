pub mod definition;
pub mod menu;
pub mod orchestrator;
pub mod state;

pub use definition::{definition_to_state, state_to_definition};
pub use menu::{ClientAction, MenuAction, MenuEntry, build_action_menu};
pub use orchestrator::{ActionOutcome, BuilderSettings, FetchOutcome, FetchTicket, Handled, ReportBuilder, SaveOutcome};
pub use state::{ReportBuilderState, is_report_dirty};
