//! Per-session context shared by the command handlers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::domain::entities::{PageData, is_truthy};

/// Name of a session variable. Names are case-insensitive on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Variable {
    Url,
    Domain,
    Row,
    Selector,
    DsmFile,
    CacheFile,
    ProposedPath,
    IncludeSidebar,
    KanbanId,
}

impl Variable {
    pub const ALL: [Variable; 9] = [
        Variable::Url,
        Variable::Domain,
        Variable::Row,
        Variable::Selector,
        Variable::DsmFile,
        Variable::CacheFile,
        Variable::ProposedPath,
        Variable::IncludeSidebar,
        Variable::KanbanId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::Url => "URL",
            Variable::Domain => "DOMAIN",
            Variable::Row => "ROW",
            Variable::Selector => "SELECTOR",
            Variable::DsmFile => "DSM_FILE",
            Variable::CacheFile => "CACHE_FILE",
            Variable::ProposedPath => "PROPOSED_PATH",
            Variable::IncludeSidebar => "INCLUDE_SIDEBAR",
            Variable::KanbanId => "KANBAN_ID",
        }
    }

    /// True for the variables that identify which page the session is on.
    pub fn is_page_context(&self) -> bool {
        matches!(self, Variable::Url | Variable::Domain | Variable::Row)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Variable::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| format!("Unknown variable: {}", s.trim()))
    }
}

/// Mutable context of one interactive session.
///
/// All values are strings; an empty string means "unset".
#[derive(Debug, Clone)]
pub struct SessionState {
    variables: BTreeMap<Variable, String>,
    /// Page data of the page the session is bound to, if any.
    pub current_page_data: Option<PageData>,
}

impl SessionState {
    pub fn new(selector: &str, include_sidebar: bool) -> Self {
        let mut variables: BTreeMap<Variable, String> =
            Variable::ALL.into_iter().map(|v| (v, String::new())).collect();
        variables.insert(Variable::Selector, selector.to_string());
        variables.insert(Variable::IncludeSidebar, include_sidebar.to_string());

        Self {
            variables,
            current_page_data: None,
        }
    }

    /// Sets a variable by name.
    ///
    /// Returns false, leaving the state untouched, when the name is unknown.
    pub fn set_variable(&mut self, name: &str, value: &str) -> bool {
        match name.parse::<Variable>() {
            Ok(variable) => {
                self.set(variable, value);
                true
            }
            Err(e) => {
                debug!("{}", e);
                false
            }
        }
    }

    pub fn set(&mut self, variable: Variable, value: impl Into<String>) {
        let value = value.into();
        let old = self.variables.insert(variable, value.clone()).unwrap_or_default();
        debug!("Variable {} changed from '{}' to '{}'", variable, old, value);
    }

    /// Returns the value of a variable by name, or `""` when unknown or unset.
    pub fn get_variable(&self, name: &str) -> &str {
        name.parse::<Variable>()
            .map(|v| self.get(v))
            .unwrap_or_default()
    }

    pub fn get(&self, variable: Variable) -> &str {
        self.variables.get(&variable).map(String::as_str).unwrap_or_default()
    }

    /// Returns the trimmed value when it is set.
    pub fn value(&self, variable: Variable) -> Option<&str> {
        Some(self.get(variable).trim()).filter(|v| !v.is_empty())
    }

    pub fn include_sidebar(&self) -> bool {
        is_truthy(self.get(Variable::IncludeSidebar))
    }

    pub fn set_include_sidebar(&mut self, include: bool) {
        self.set(Variable::IncludeSidebar, include.to_string());
    }

    /// Lists the variables among `required` that are unset.
    pub fn missing_variables(&self, required: &[Variable]) -> Vec<Variable> {
        required
            .iter()
            .copied()
            .filter(|v| self.value(*v).is_none())
            .collect()
    }

    /// All variables in display order.
    pub fn variables(&self) -> impl Iterator<Item = (Variable, &str)> {
        self.variables.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Forgets the current page: URL, DOMAIN, ROW, PROPOSED_PATH, CACHE_FILE,
    /// KANBAN_ID and the page data.
    pub fn reset_page_context(&mut self) {
        for variable in [
            Variable::Url,
            Variable::Domain,
            Variable::Row,
            Variable::ProposedPath,
            Variable::CacheFile,
            Variable::KanbanId,
        ] {
            self.variables.insert(variable, String::new());
        }
        self.current_page_data = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new("#main", false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = SessionState::default();

        assert_eq!(state.get(Variable::Selector), "#main");
        assert!(!state.include_sidebar());
        assert_eq!(state.get(Variable::Url), "");
        assert!(state.current_page_data.is_none());
    }

    #[test]
    fn test_set_variable_is_case_insensitive() {
        let mut state = SessionState::default();

        assert!(state.set_variable("url", "http://web.musc.edu"));
        assert_eq!(state.get_variable("URL"), "http://web.musc.edu");
        assert_eq!(state.get_variable("Url"), "http://web.musc.edu");
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        let mut state = SessionState::default();

        assert!(!state.set_variable("COLOR", "blue"));
        assert_eq!(state.get_variable("COLOR"), "");
    }

    #[test]
    fn test_include_sidebar_truthiness() {
        let mut state = SessionState::default();
        for (value, expected) in [("true", true), ("YES", true), ("1", true), ("on", true), ("no", false), ("", false)] {
            state.set_variable("INCLUDE_SIDEBAR", value);
            assert_eq!(state.include_sidebar(), expected, "value: {value:?}");
        }
    }

    #[test]
    fn test_missing_variables() {
        let mut state = SessionState::default();
        state.set(Variable::Url, "  ");

        assert_eq!(
            state.missing_variables(&[Variable::Url, Variable::Selector, Variable::Domain]),
            vec![Variable::Url, Variable::Domain]
        );
    }

    #[test]
    fn test_reset_page_context_keeps_preferences() {
        let mut state = SessionState::new("#content", true);
        state.set(Variable::Url, "http://web.musc.edu");
        state.set(Variable::Domain, "Enterprise");
        state.set(Variable::CacheFile, "migration_cache/page_check_Enterprise-10.json");
        state.set(Variable::DsmFile, "dsm-0612.xlsx");
        state.current_page_data = Some(PageData::default());

        state.reset_page_context();

        assert_eq!(state.get(Variable::Url), "");
        assert_eq!(state.get(Variable::CacheFile), "");
        assert!(state.current_page_data.is_none());
        assert_eq!(state.get(Variable::Selector), "#content");
        assert_eq!(state.get(Variable::DsmFile), "dsm-0612.xlsx");
        assert!(state.include_sidebar());
    }

    #[test]
    fn test_variables_in_display_order() {
        let names: Vec<_> = SessionState::default()
            .variables()
            .map(|(v, _)| v.as_str())
            .collect();
        assert_eq!(names[0], "URL");
        assert_eq!(names.len(), 9);
    }
}
