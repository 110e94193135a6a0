//! Report action menu: client-side entries plus the server lifecycle actions a report offers
use crate::core::models::{LifecycleAction, Report};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Menu entries handled locally by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ClientAction {
    Save,
    SaveAs,
    Reset,
    ClearAll,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    Client(ClientAction),
    Server(LifecycleAction),
}

impl MenuAction {
    pub fn id(&self) -> String {
        match self {
            MenuAction::Client(action) => action.to_string(),
            MenuAction::Server(action) => action.to_string(),
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, MenuAction::Server(_))
    }

    /// Label when none is configured: the id with underscores as spaces, first letter upper
    pub fn default_label(&self) -> String {
        let words = self.id().replace('_', " ");
        let mut chars = words.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => words,
        }
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for MenuAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(action) = ClientAction::from_str(s) {
            return Ok(MenuAction::Client(action));
        }
        LifecycleAction::from_str(s)
            .map(MenuAction::Server)
            .map_err(|_| format!("unknown menu action: {s}"))
    }
}

impl Serialize for MenuAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for MenuAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MenuAction::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub action: MenuAction,
    pub label: String,
    pub enabled: bool,
}

impl MenuEntry {
    fn new(action: MenuAction, enabled: bool) -> Self {
        Self {
            label: action.default_label(),
            action,
            enabled,
        }
    }
}

/// Client entries first, always listed with their enabled flag, then the lifecycle actions
/// the report declares, in canonical order. Without a report there are no server entries.
pub fn build_action_menu(
    report: Option<&Report>,
    report_dirty: bool,
    has_dataset: bool,
    has_any_state: bool,
) -> Vec<MenuEntry> {
    let mut entries: Vec<MenuEntry> = ClientAction::iter()
        .map(|action| {
            let enabled = match action {
                ClientAction::Save => report_dirty && has_dataset,
                ClientAction::SaveAs | ClientAction::Export => has_dataset,
                ClientAction::Reset => report.is_some() && report_dirty,
                ClientAction::ClearAll => has_any_state,
            };
            MenuEntry::new(MenuAction::Client(action), enabled)
        })
        .collect();
    if let Some(report) = report {
        entries.extend(
            report
                .lifecycle_actions()
                .into_iter()
                .map(|action| MenuEntry::new(MenuAction::Server(action), true)),
        );
    }
    entries
}
