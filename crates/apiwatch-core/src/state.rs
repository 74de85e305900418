// View-state published by the dashboard.

use std::path::PathBuf;
use std::sync::Arc;

use apiwatch_api::{EndpointId, LogEntry, MonitoredEndpoint, OverviewSummary};
use chrono::{DateTime, Utc};

/// Snapshot of everything the dashboard view renders.
///
/// Collections are behind `Arc` so cloning a snapshot for every render is
/// cheap.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub overview: OverviewSummary,
    /// Server order.
    pub endpoints: Arc<Vec<MonitoredEndpoint>>,
    pub selected_id: Option<EndpointId>,
    /// Always belongs to `selected_id`; empty when nothing is selected.
    pub logs: Arc<Vec<LogEntry>>,
    /// Whether `logs` holds a response for the current selection.
    pub logs_loaded: bool,
    pub last_error: Option<String>,
    /// One-shot message such as an import summary.
    pub notice: Option<String>,
    pub form: FormInputs,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    /// Refreshes currently waiting on the service.
    pub in_flight: usize,
}

/// What the log pane should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogView {
    NoSelection,
    Loading,
    Empty,
    Entries,
}

impl DashboardState {
    pub fn selected_endpoint(&self) -> Option<&MonitoredEndpoint> {
        let id = self.selected_id?;
        self.endpoints.iter().find(|e| e.id == id)
    }

    pub fn log_view(&self) -> LogView {
        match (self.selected_id, self.logs_loaded, self.logs.is_empty()) {
            (None, _, _) => LogView::NoSelection,
            (Some(_), false, _) => LogView::Loading,
            (Some(_), true, true) => LogView::Empty,
            (Some(_), true, false) => LogView::Entries,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight > 0
    }
}

// ── Form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Url,
    ImportPath,
}

impl FormField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Url, Self::ImportPath];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Url => "URL",
            Self::ImportPath => "Import file",
        }
    }
}

/// Single-keystroke edit applied to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEdit {
    Insert(char),
    Backspace,
    Clear,
}

/// Text typed into the add form and the import field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub name: String,
    pub url: String,
    pub import_path: String,
}

impl FormInputs {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Url => &self.url,
            FormField::ImportPath => &self.import_path,
        }
    }

    fn get_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Url => &mut self.url,
            FormField::ImportPath => &mut self.import_path,
        }
    }

    pub fn set(&mut self, field: FormField, value: String) {
        *self.get_mut(field) = value;
    }

    pub fn apply(&mut self, field: FormField, edit: FormEdit) {
        let text = self.get_mut(field);
        match edit {
            FormEdit::Insert(c) => text.push(c),
            FormEdit::Backspace => {
                text.pop();
            }
            FormEdit::Clear => text.clear(),
        }
    }

    /// The import path, or `None` when the field is blank.
    pub fn import_file(&self) -> Option<PathBuf> {
        let trimmed = self.import_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiwatch_api::Status;

    fn endpoint(id: i64) -> MonitoredEndpoint {
        MonitoredEndpoint {
            id: EndpointId(id),
            name: format!("svc-{id}"),
            url: format!("https://svc-{id}.example.com"),
            last_status: Status::Unknown,
            last_latency: None,
            last_status_code: None,
            last_checked_at: None,
            last_alert_at: None,
            created_at: None,
        }
    }

    #[test]
    fn log_view_states() {
        let mut state = DashboardState::default();
        assert_eq!(state.log_view(), LogView::NoSelection);

        state.selected_id = Some(EndpointId(1));
        assert_eq!(state.log_view(), LogView::Loading);

        state.logs_loaded = true;
        assert_eq!(state.log_view(), LogView::Empty);
    }

    #[test]
    fn selected_endpoint_lookup() {
        let state = DashboardState {
            endpoints: Arc::new(vec![endpoint(1), endpoint(2)]),
            selected_id: Some(EndpointId(2)),
            ..DashboardState::default()
        };
        assert_eq!(state.selected_endpoint().map(|e| e.name.as_str()), Some("svc-2"));
    }

    #[test]
    fn form_edits() {
        let mut form = FormInputs::default();
        for c in "apix".chars() {
            form.apply(FormField::Name, FormEdit::Insert(c));
        }
        form.apply(FormField::Name, FormEdit::Backspace);
        assert_eq!(form.get(FormField::Name), "api");

        form.set(FormField::Url, "https://x".into());
        form.apply(FormField::Url, FormEdit::Clear);
        assert!(form.url.is_empty());

        // Backspace on empty input is a no-op.
        form.apply(FormField::Url, FormEdit::Backspace);
        assert!(form.url.is_empty());
    }

    #[test]
    fn blank_import_path_is_none() {
        let mut form = FormInputs::default();
        assert_eq!(form.import_file(), None);
        form.import_path = "   ".into();
        assert_eq!(form.import_file(), None);
        form.import_path = " /tmp/apis.txt ".into();
        assert_eq!(form.import_file(), Some(PathBuf::from("/tmp/apis.txt")));
    }
}
