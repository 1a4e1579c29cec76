use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use shared::protocol::SortSpec;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::{
    api::RemoteDataApi,
    download::download_url,
    error::{ClientError, ErrorHandler},
    list::{
        EntityDescriptor, ListDataSource, ListPhase, ListQuery, ListSettings, ListState, Record,
    },
    master::MasterContext,
    session::AuthContext,
};

/// Result of [`ListController::toggle_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    Unlinked,
    /// The server refused or could not be reached; the record keeps its flag.
    Reverted,
    /// No selected row, or the current master does not support linking this list.
    Unavailable,
}

struct ControllerState {
    query: ListQuery,
    master: MasterContext,
    started: bool,
}

/// Decides when one entity list reloads and under which [`crate::list::QueryMode`].
pub struct ListController<E: EntityDescriptor> {
    descriptor: Arc<E>,
    data_source: Arc<ListDataSource<E>>,
    api: Arc<dyn RemoteDataApi>,
    auth: Arc<dyn AuthContext>,
    errors: Arc<dyn ErrorHandler>,
    settings: ListSettings,
    inner: Mutex<ControllerState>,
    pending_filter: StdMutex<Option<JoinHandle<()>>>,
}

impl<E: EntityDescriptor> ListController<E> {
    pub fn new(
        descriptor: E,
        api: Arc<dyn RemoteDataApi>,
        auth: Arc<dyn AuthContext>,
        errors: Arc<dyn ErrorHandler>,
        settings: ListSettings,
        master: MasterContext,
    ) -> Arc<Self> {
        let descriptor = Arc::new(descriptor);
        let data_source =
            ListDataSource::new(Arc::clone(&descriptor), Arc::clone(&api), Arc::clone(&errors));
        Arc::new(Self {
            descriptor,
            data_source,
            api,
            auth,
            errors,
            settings,
            inner: Mutex::new(ControllerState {
                query: ListQuery::new(settings.page_size),
                master,
                started: false,
            }),
            pending_filter: StdMutex::new(None),
        })
    }

    /// Issues the first load. Call once the hosting view has settled; signals that
    /// arrive earlier only update the query and master context.
    pub async fn start(&self) -> Option<JoinHandle<()>> {
        let mut state = self.inner.lock().await;
        if state.started {
            return None;
        }
        state.started = true;
        info!(list = self.descriptor.name(), master = %state.master.master, "list started");
        self.reload_locked(&state)
    }

    /// Feeds one keystroke's worth of filter text. The value is trimmed and
    /// lower-cased, then applied once input has been quiet for the debounce window
    /// and only if it differs from the active filter.
    pub fn input_filter(self: &Arc<Self>, raw: &str) {
        let value = normalize_filter(raw);
        let delay = self.settings.debounce;
        let controller: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = controller.upgrade() {
                controller.apply_filter(value).await;
            }
        });
        if let Some(previous) = self.lock_pending_filter().replace(task) {
            previous.abort();
        }
    }

    /// Applies filter text at once (Enter in the filter box), dropping pending input.
    pub async fn commit_filter(&self, raw: &str) -> Option<JoinHandle<()>> {
        self.cancel_pending_filter();
        self.apply_filter(normalize_filter(raw)).await
    }

    async fn apply_filter(&self, value: String) -> Option<JoinHandle<()>> {
        let mut state = self.inner.lock().await;
        if state.query.filter == value {
            debug!(list = self.descriptor.name(), "filter unchanged; skipping reload");
            return None;
        }
        debug!(list = self.descriptor.name(), filter = %value, "filter settled");
        state.query.filter = value;
        state.query.page_index = 0;
        self.data_source.clear_selection();
        self.reload_locked(&state)
    }

    /// Escape in the filter box: drop any pending input and reload without a filter.
    pub async fn clear_filter(&self) -> Option<JoinHandle<()>> {
        self.cancel_pending_filter();
        let mut state = self.inner.lock().await;
        state.query.filter.clear();
        state.query.page_index = 0;
        self.data_source.clear_selection();
        self.reload_locked(&state)
    }

    pub async fn set_sort(&self, sort: Option<SortSpec>) -> Option<JoinHandle<()>> {
        let mut state = self.inner.lock().await;
        state.query.sort = sort;
        state.query.page_index = 0;
        self.data_source.clear_selection();
        self.reload_locked(&state)
    }

    /// Paginator change: keeps the requested page rather than returning to the first.
    pub async fn set_page(&self, page_index: u32, page_size: u32) -> Option<JoinHandle<()>> {
        let mut state = self.inner.lock().await;
        state.query.page_index = page_index;
        state.query.page_size = page_size.max(1);
        self.data_source.clear_selection();
        self.reload_locked(&state)
    }

    /// Replaces the master context. The new context is always stored, since
    /// [`Self::toggle_link`] and [`Self::download_url`] read the latest one. Changes
    /// this list does not care about stop there; relevant ones clear the selection,
    /// return to the first page and reload.
    pub async fn set_master(&self, next: MasterContext) -> Option<JoinHandle<()>> {
        let mut state = self.inner.lock().await;
        let relevant = self.descriptor.is_relevant_change(&state.master, &next);
        state.master = next;
        if !relevant {
            return None;
        }
        debug!(list = self.descriptor.name(), master = %state.master.master, "relevant master change");
        state.query.page_index = 0;
        self.data_source.clear_selection();
        self.reload_locked(&state)
    }

    /// Reloads with the current query. The selection survives as the fresh copy of
    /// the same row, or is dropped when the row is gone.
    pub async fn reload(&self) -> Option<JoinHandle<()>> {
        let state = self.inner.lock().await;
        self.reload_locked(&state)
    }

    /// Row click. An unselected row replaces the selection; clicking the selected row
    /// with the toggle modifier (ctrl/cmd) deselects it. Returns whether the selection
    /// changed.
    pub async fn select_row(&self, id: i64, toggle_modifier: bool) -> bool {
        // Serialised with query changes, which clear the selection.
        let _state = self.inner.lock().await;
        self.data_source.select(id, toggle_modifier)
    }

    pub async fn selection(&self) -> Option<E::Record> {
        self.data_source.selection()
    }

    /// Emits the new selection (or `None`) on every change, including when a
    /// published page refreshes or drops the selected row.
    pub fn subscribe_selection(&self) -> broadcast::Receiver<Option<E::Record>> {
        self.data_source.subscribe_selection()
    }

    /// Makes or breaks the link between the master person and the selected row. On
    /// success the row's `linked` flag flips in place; nothing is reloaded.
    pub async fn toggle_link(&self) -> LinkOutcome {
        let (target, record) = {
            let state = self.inner.lock().await;
            let Some(record) = self.data_source.selection() else {
                return LinkOutcome::Unavailable;
            };
            let Some(target) = self.descriptor.link_target(&state.master, &record) else {
                return LinkOutcome::Unavailable;
            };
            (target, record)
        };

        let link = !record.linked();
        match target.apply(self.api.as_ref(), link).await {
            Ok(status) if status.is_success() => {
                let id = record.id();
                self.data_source.update_record(id, |row| row.set_linked(link));
                info!(list = self.descriptor.name(), id, linked = link, "link updated");
                if link {
                    LinkOutcome::Linked
                } else {
                    LinkOutcome::Unlinked
                }
            }
            Ok(status) => {
                warn!(
                    list = self.descriptor.name(),
                    id = record.id(),
                    status = status.0,
                    "link update refused; reverting"
                );
                LinkOutcome::Reverted
            }
            Err(err) => {
                self.errors.on_error(self.descriptor.name(), &err);
                LinkOutcome::Reverted
            }
        }
    }

    /// GET link that exports the list as currently queried, or `None` when the list
    /// has nothing to show.
    pub async fn download_url(
        &self,
        service_url: &str,
        content_type: &str,
    ) -> Result<Option<String>, ClientError> {
        let state = self.inner.lock().await;
        let mode = self.descriptor.query_mode(&state.master, self.auth.as_ref());
        match self.descriptor.endpoint(&mode) {
            Some(endpoint) => {
                download_url(service_url, &endpoint, &state.query, content_type).map(Some)
            }
            None => Ok(None),
        }
    }

    pub async fn query(&self) -> ListQuery {
        self.inner.lock().await.query.clone()
    }

    pub async fn master(&self) -> MasterContext {
        self.inner.lock().await.master.clone()
    }

    pub fn state(&self) -> ListState<E::Record> {
        self.data_source.state()
    }

    pub fn phase(&self) -> ListPhase {
        self.data_source.phase()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.data_source.subscribe_loading()
    }

    pub fn count(&self) -> watch::Receiver<u64> {
        self.data_source.subscribe_count()
    }

    pub fn content(&self) -> watch::Receiver<Vec<E::Record>> {
        self.data_source.subscribe_content()
    }

    pub fn content_stream(&self) -> WatchStream<Vec<E::Record>> {
        self.data_source.content_stream()
    }

    pub fn descriptor(&self) -> &E {
        &self.descriptor
    }

    pub fn data_source(&self) -> &Arc<ListDataSource<E>> {
        &self.data_source
    }

    /// Tears down the list: drops pending filter input.
    pub fn shutdown(&self) {
        self.cancel_pending_filter();
    }

    fn reload_locked(&self, state: &ControllerState) -> Option<JoinHandle<()>> {
        if !state.started {
            return None;
        }
        let mode = self.descriptor.query_mode(&state.master, self.auth.as_ref());
        self.data_source.load(&mode, &state.query)
    }

    fn cancel_pending_filter(&self) {
        if let Some(task) = self.lock_pending_filter().take() {
            task.abort();
        }
    }

    fn lock_pending_filter(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending_filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize_filter(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl<E: EntityDescriptor> Drop for ListController<E> {
    fn drop(&mut self) {
        self.cancel_pending_filter();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
