// ── Dashboard controller ──
//
// Owns the view-state and every gateway call. State lives in a
// `watch::Sender<DashboardState>`; all mutations go through it, so
// subscribers always see a consistent snapshot.
//
// Refreshes may overlap. Each one draws a generation number and its outcome
// (data or error) is applied only if no newer outcome has been applied
// first. Local mutations retire every refresh issued before them. Log fetches
// additionally capture the selection epoch, which is bumped on every
// selection change, and are dropped if the selection moved on.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use apiwatch_api::{EndpointId, LogQuery, MonitorClient};
use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::poll::{self, PollHandle};
use crate::state::{DashboardState, FormEdit, FormField};

/// Fallback upload name when the path has no file component.
const DEFAULT_IMPORT_NAME: &str = "import.txt";

/// The monitoring dashboard.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Operations record their
/// failure in `last_error` in addition to returning it.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: MonitorClient,
    state: watch::Sender<DashboardState>,
    /// Last refresh generation handed out.
    refresh_issued: AtomicU64,
    /// Newest generation whose outcome is on screen. Refreshes at or below
    /// it are stale.
    refresh_applied: AtomicU64,
    /// Bumped whenever `selected_id` changes.
    selection_epoch: AtomicU64,
    logs_issued: AtomicU64,
    logs_applied: AtomicU64,
    /// Cancel token of the active poll, if any.
    poll: Mutex<Option<CancellationToken>>,
}

impl Dashboard {
    /// Build a dashboard and its HTTP client from configuration.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = MonitorClient::new(config.api_base.clone(), &config.transport())?;
        Ok(Self::with_client(client, config))
    }

    /// Build a dashboard around an existing client.
    pub fn with_client(client: MonitorClient, config: DashboardConfig) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                state,
                refresh_issued: AtomicU64::new(0),
                refresh_applied: AtomicU64::new(0),
                selection_epoch: AtomicU64::new(0),
                logs_issued: AtomicU64::new(0),
                logs_applied: AtomicU64::new(0),
                poll: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &MonitorClient {
        &self.inner.client
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Reload the overview and endpoint list, then the selection's logs.
    ///
    /// Overview and list are fetched concurrently and applied together, only
    /// if both succeed. On failure the previous data stays on screen and the
    /// message is recorded.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let inner = &self.inner;
        let generation = inner.refresh_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&inner.state);

        let (overview, endpoints) = tokio::join!(
            inner.client.fetch_overview(),
            inner.client.list_endpoints()
        );
        let (overview, endpoints) = match (overview, endpoints) {
            (Ok(overview), Ok(endpoints)) => (overview, endpoints),
            (Err(e), _) | (_, Err(e)) => {
                let err = CoreError::from(e);
                self.record_refresh_error(generation, &err);
                return Err(err);
            }
        };

        let mut dropped_selection = None;
        let applied = inner.state.send_if_modified(|state| {
            if generation <= inner.refresh_applied.load(Ordering::SeqCst) {
                return false;
            }
            inner.refresh_applied.store(generation, Ordering::SeqCst);
            state.overview = overview;
            state.endpoints = Arc::new(endpoints);
            state.last_error = None;
            state.last_refreshed_at = Some(Utc::now());

            let vanished = state
                .selected_id
                .filter(|id| !state.endpoints.iter().any(|e| e.id == *id));
            if let Some(id) = vanished {
                inner.selection_epoch.fetch_add(1, Ordering::SeqCst);
                state.selected_id = None;
                state.logs = Arc::default();
                state.logs_loaded = false;
                dropped_selection = Some(id);
            }
            true
        });

        if !applied {
            debug!(generation, "discarding stale refresh result");
            return Ok(());
        }
        if let Some(id) = dropped_selection {
            info!(%id, "selected endpoint no longer exists, clearing selection");
        }

        match self.current_selection() {
            Some((id, epoch)) => self.load_logs(id, epoch).await,
            None => Ok(()),
        }
    }

    fn record_refresh_error(&self, generation: u64, err: &CoreError) {
        let inner = &self.inner;
        let recorded = inner.state.send_if_modified(|state| {
            // A newer outcome, or a local mutation, is already on screen.
            if generation <= inner.refresh_applied.load(Ordering::SeqCst) {
                return false;
            }
            inner.refresh_applied.store(generation, Ordering::SeqCst);
            state.last_error = Some(err.to_string());
            true
        });
        if recorded {
            warn!(generation, error = %err, "refresh failed");
        } else {
            debug!(generation, error = %err, "ignoring failure of stale refresh");
        }
    }

    /// Mark every refresh issued so far as stale. Called under the state
    /// lock by local mutations, so a response fetched before the mutation
    /// can never overwrite it.
    fn retire_refreshes(&self) {
        let inner = &self.inner;
        let issued = inner.refresh_issued.load(Ordering::SeqCst);
        inner.refresh_applied.fetch_max(issued, Ordering::SeqCst);
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select an endpoint and load its logs.
    ///
    /// Logs of the previous selection are cleared at once, so the view
    /// never pairs one endpoint with another's history.
    pub async fn select_endpoint(&self, id: EndpointId) -> Result<(), CoreError> {
        let mut epoch = 0;
        self.inner.state.send_modify(|state| {
            epoch = self.inner.selection_epoch.fetch_add(1, Ordering::SeqCst) + 1;
            state.selected_id = Some(id);
            state.logs = Arc::default();
            state.logs_loaded = false;
        });
        debug!(%id, epoch, "endpoint selected");
        self.load_logs(id, epoch).await
    }

    /// Deselect and drop any logs.
    pub fn clear_selection(&self) {
        self.inner.state.send_if_modified(|state| {
            if state.selected_id.is_none() {
                return false;
            }
            self.inner.selection_epoch.fetch_add(1, Ordering::SeqCst);
            state.selected_id = None;
            state.logs = Arc::default();
            state.logs_loaded = false;
            true
        });
    }

    fn current_selection(&self) -> Option<(EndpointId, u64)> {
        // Epoch bumps happen under the write lock, so reading both under
        // the read lock yields a matching pair.
        let state = self.inner.state.borrow();
        let id = state.selected_id?;
        Some((id, self.inner.selection_epoch.load(Ordering::SeqCst)))
    }

    async fn load_logs(&self, id: EndpointId, epoch: u64) -> Result<(), CoreError> {
        let inner = &self.inner;
        let generation = inner.logs_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let query = LogQuery::with_limit(inner.config.log_limit);

        let result = inner.client.fetch_logs(id, &query).await;
        let is_current = |state: &DashboardState| {
            state.selected_id == Some(id)
                && inner.selection_epoch.load(Ordering::SeqCst) == epoch
                && generation >= inner.logs_applied.load(Ordering::SeqCst)
        };

        match result {
            Ok(entries) => {
                let count = entries.len();
                let applied = inner.state.send_if_modified(|state| {
                    if !is_current(state) {
                        return false;
                    }
                    inner.logs_applied.store(generation, Ordering::SeqCst);
                    state.logs = Arc::new(entries);
                    state.logs_loaded = true;
                    true
                });
                if applied {
                    debug!(%id, count, "logs loaded");
                } else {
                    debug!(%id, epoch, "discarding logs for a stale selection");
                }
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                inner.state.send_if_modified(|state| {
                    if !is_current(state) {
                        return false;
                    }
                    state.last_error = Some(err.to_string());
                    true
                });
                warn!(%id, error = %err, "failed to load logs");
                Err(err)
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Register a new endpoint, clear the form, and refresh.
    ///
    /// Blank input is rejected without contacting the service. On failure
    /// the form keeps what the user typed.
    pub async fn add_endpoint(&self, name: &str, url: &str) -> Result<(), CoreError> {
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() {
            return self.fail(CoreError::validation("name", "Name is required"));
        }
        if url.is_empty() {
            return self.fail(CoreError::validation("url", "URL is required"));
        }

        self.clear_error();
        match self.inner.client.create_endpoint(name, url).await {
            Ok(created) => {
                info!(name, url, id = ?created.endpoint().map(|e| e.id), "endpoint added");
                self.inner.state.send_modify(|state| {
                    self.retire_refreshes();
                    state.form.name.clear();
                    state.form.url.clear();
                });
                self.follow_up_refresh().await;
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Submit the add form with whatever the state currently holds.
    pub async fn submit_form(&self) -> Result<(), CoreError> {
        let form = self.inner.state.borrow().form.clone();
        self.add_endpoint(&form.name, &form.url).await
    }

    /// Delete an endpoint and refresh.
    ///
    /// The endpoint leaves the local list right away; if it was selected,
    /// the selection and its logs are cleared before the refresh starts.
    pub async fn remove_endpoint(&self, id: EndpointId) -> Result<(), CoreError> {
        self.clear_error();
        if let Err(e) = self.inner.client.delete_endpoint(id).await {
            return self.fail(e.into());
        }

        info!(%id, "endpoint removed");
        self.inner.state.send_modify(|state| {
            self.retire_refreshes();
            if state.selected_id == Some(id) {
                self.inner.selection_epoch.fetch_add(1, Ordering::SeqCst);
                state.selected_id = None;
                state.logs = Arc::default();
                state.logs_loaded = false;
            }
            if state.endpoints.iter().any(|e| e.id == id) {
                state.endpoints = Arc::new(
                    state
                        .endpoints
                        .iter()
                        .filter(|e| e.id != id)
                        .cloned()
                        .collect(),
                );
            }
        });
        self.follow_up_refresh().await;
        Ok(())
    }

    /// Upload a file of endpoints and refresh.
    ///
    /// `None` or a blank path records "Choose a file to import" without
    /// contacting the service.
    pub async fn import_file(&self, path: Option<PathBuf>) -> Result<(), CoreError> {
        let Some(path) = path.filter(|p| !p.to_string_lossy().trim().is_empty()) else {
            return self.fail(CoreError::validation("file", "Choose a file to import"));
        };

        self.clear_error();
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(source) => return self.fail(CoreError::Io { path, source }),
        };
        let file_name = path
            .file_name()
            .map_or_else(|| DEFAULT_IMPORT_NAME.to_owned(), |n| n.to_string_lossy().into_owned());

        match self.inner.client.bulk_import(&file_name, contents).await {
            Ok(summary) => {
                info!(file = %path.display(), added = summary.added, skipped = summary.skipped, "import finished");
                self.inner.state.send_modify(|state| {
                    self.retire_refreshes();
                    state.notice = Some(format!(
                        "Imported: {} added, {} skipped",
                        summary.added, summary.skipped
                    ));
                    state.form.import_path.clear();
                });
                self.follow_up_refresh().await;
                Ok(())
            }
            Err(e) => self.fail(e.into()),
        }
    }

    /// Import the file named in the form's import field.
    pub async fn import_from_form(&self) -> Result<(), CoreError> {
        let path = self.inner.state.borrow().form.import_file();
        self.import_file(path).await
    }

    async fn follow_up_refresh(&self) {
        // The failure is already in `last_error`; the mutation itself succeeded.
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "refresh after mutation failed");
        }
    }

    // ── Form & messages ──────────────────────────────────────────────

    pub fn set_form_field(&self, field: FormField, value: String) {
        self.inner.state.send_modify(|state| state.form.set(field, value));
    }

    pub fn edit_form(&self, field: FormField, edit: FormEdit) {
        self.inner.state.send_modify(|state| state.form.apply(field, edit));
    }

    pub fn dismiss_notice(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.notice.take().is_some());
    }

    pub fn dismiss_error(&self) {
        self.clear_error();
    }

    fn clear_error(&self) {
        self.inner
            .state
            .send_if_modified(|state| state.last_error.take().is_some());
    }

    fn fail(&self, err: CoreError) -> Result<(), CoreError> {
        warn!(error = %err, "dashboard action failed");
        let message = err.to_string();
        self.inner
            .state
            .send_modify(|state| state.last_error = Some(message));
        Err(err)
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Refresh every `period` until the returned handle is dropped.
    ///
    /// The first refresh runs immediately. Starting a new poll stops the
    /// previous one.
    pub fn start_polling(&self, period: Duration) -> PollHandle {
        let cancel = CancellationToken::new();
        let previous = self
            .inner
            .poll
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel.clone());
        if let Some(previous) = previous {
            debug!("replacing active poll");
            previous.cancel();
        }
        poll::spawn(self.clone(), period, cancel)
    }
}

/// Counts a refresh in `DashboardState::in_flight` for as long as it lives,
/// including when the refresh future is dropped mid-way.
struct InFlight<'a>(&'a watch::Sender<DashboardState>);

impl<'a> InFlight<'a> {
    fn enter(state: &'a watch::Sender<DashboardState>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}
