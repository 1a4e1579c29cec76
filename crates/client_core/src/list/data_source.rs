use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::Master,
    protocol::{PageRequest, ResultSet},
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::{
    api::RemoteDataApi,
    error::ErrorHandler,
    list::{EntityDescriptor, ListQuery, QueryMode, Record, Relation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<R> {
    pub loading: bool,
    pub total_count: u64,
    pub page: Vec<R>,
    pub selection: Option<R>,
}

enum LoadRequest {
    Unfiltered,
    ByRelation {
        via: Master,
        related_id: i64,
        related_key: Option<String>,
    },
    ById(i64),
}

impl LoadRequest {
    /// `None` when the mode can only yield the empty result.
    fn from_mode(mode: &QueryMode) -> Option<Self> {
        match mode {
            QueryMode::Unfiltered => Some(LoadRequest::Unfiltered),
            QueryMode::ByRelation(Relation {
                via,
                related_id: Some(related_id),
                related_key,
            }) => Some(LoadRequest::ByRelation {
                via: *via,
                related_id: *related_id,
                related_key: related_key.clone(),
            }),
            QueryMode::ByIdentity(Some(id)) => Some(LoadRequest::ById(*id)),
            QueryMode::ByRelation(_) | QueryMode::ByIdentity(None) | QueryMode::Cleared => None,
        }
    }
}

/// Issues the request behind one list and publishes loading flag, total count and
/// current page. Each `load`/`unload` opens a new generation; completions from an
/// older generation are dropped, so the most recently initiated load always wins.
///
/// The single selected row lives here too: whenever a page is published the
/// selection is swapped for the fresh row with the same id, or dropped when that
/// row is no longer on the page.
pub struct ListDataSource<E: EntityDescriptor> {
    descriptor: Arc<E>,
    api: Arc<dyn RemoteDataApi>,
    errors: Arc<dyn ErrorHandler>,
    generation: Mutex<u64>,
    loading: watch::Sender<bool>,
    count: watch::Sender<u64>,
    content: watch::Sender<Vec<E::Record>>,
    selection: Mutex<Option<E::Record>>,
    selection_events: broadcast::Sender<Option<E::Record>>,
}

impl<E: EntityDescriptor> ListDataSource<E> {
    pub fn new(
        descriptor: Arc<E>,
        api: Arc<dyn RemoteDataApi>,
        errors: Arc<dyn ErrorHandler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            descriptor,
            api,
            errors,
            generation: Mutex::new(0),
            loading: watch::channel(false).0,
            count: watch::channel(0).0,
            content: watch::channel(Vec::new()).0,
            selection: Mutex::new(None),
            selection_events: broadcast::channel(64).0,
        })
    }

    /// Starts a load. Returns the handle of the spawned request, or `None` when the
    /// mode resolved to the empty result without touching the network.
    pub fn load(self: &Arc<Self>, mode: &QueryMode, query: &ListQuery) -> Option<JoinHandle<()>> {
        let Some(request) = LoadRequest::from_mode(mode) else {
            debug!(
                list = self.descriptor.name(),
                mode = mode.label(),
                "nothing to query; showing empty list"
            );
            self.unload();
            return None;
        };

        let page = query.page_request();
        let generation = {
            let mut generation = self.lock_generation();
            *generation += 1;
            self.loading.send_replace(true);
            *generation
        };
        debug!(
            list = self.descriptor.name(),
            generation,
            mode = mode.label(),
            offset = page.offset,
            limit = page.limit,
            "load started"
        );

        let source = Arc::clone(self);
        Some(tokio::spawn(async move {
            source.run(generation, request, page).await;
        }))
    }

    /// Clears to the empty result and supersedes anything in flight.
    pub fn unload(&self) {
        let mut generation = self.lock_generation();
        *generation += 1;
        self.count.send_replace(0);
        self.refresh_selection(&[]);
        self.content.send_replace(Vec::new());
        self.loading.send_replace(false);
    }

    async fn run(&self, generation: u64, request: LoadRequest, page: PageRequest) {
        let api = self.api.as_ref();
        let result = match &request {
            LoadRequest::Unfiltered => self.descriptor.load_unfiltered(api, &page).await,
            LoadRequest::ByRelation {
                via,
                related_id,
                related_key,
            } => {
                self.descriptor
                    .load_by_relation(api, *via, *related_id, related_key.as_deref(), &page)
                    .await
            }
            LoadRequest::ById(id) => self
                .descriptor
                .load_by_id(api, *id)
                .await
                .map(|record| match record {
                    Some(record) => ResultSet {
                        count: 1,
                        records: vec![record],
                    },
                    None => ResultSet::empty(),
                }),
        };

        let current = self.lock_generation();
        if *current != generation {
            debug!(
                list = self.descriptor.name(),
                generation,
                current = *current,
                "discarding superseded response"
            );
            return;
        }
        match result {
            Ok(result_set) => {
                info!(
                    list = self.descriptor.name(),
                    generation,
                    count = result_set.count,
                    rows = result_set.records.len(),
                    "load complete"
                );
                self.count.send_replace(result_set.count);
                self.refresh_selection(&result_set.records);
                self.content.send_replace(result_set.records);
            }
            Err(err) => self.errors.on_error(self.descriptor.name(), &err),
        }
        self.loading.send_replace(false);
    }

    /// Applies `update` to the row with `id` in the current page, if present, and
    /// to the selection when it is that row.
    pub fn update_record(&self, id: i64, update: impl FnOnce(&mut E::Record)) -> bool {
        let mut updated = None;
        self.content.send_if_modified(|rows| match rows.iter_mut().find(|row| row.id() == id) {
            Some(row) => {
                update(row);
                updated = Some(row.clone());
                true
            }
            None => false,
        });
        let Some(row) = updated else {
            return false;
        };
        let mut selection = self.lock_selection();
        if selection.as_ref().is_some_and(|current| current.id() == id) {
            self.replace_selection(&mut selection, Some(row));
        }
        true
    }

    /// Row click. An unselected row replaces the selection; clicking the selected row
    /// with the toggle modifier (ctrl/cmd) deselects it. Returns whether the selection
    /// changed.
    pub fn select(&self, id: i64, toggle_modifier: bool) -> bool {
        // Held so a page cannot be published between the lookup and the update.
        let _publishing = self.lock_generation();
        let Some(record) = self.find_record(id) else {
            return false;
        };
        let mut selection = self.lock_selection();
        let selected = selection.as_ref().is_some_and(|current| current.id() == id);
        if !selected {
            self.replace_selection(&mut selection, Some(record));
        } else if toggle_modifier {
            self.replace_selection(&mut selection, None);
        } else {
            return false;
        }
        true
    }

    pub fn clear_selection(&self) {
        let mut selection = self.lock_selection();
        self.replace_selection(&mut selection, None);
    }

    pub fn selection(&self) -> Option<E::Record> {
        self.lock_selection().clone()
    }

    /// Emits the new selection (or `None`) on every change.
    pub fn subscribe_selection(&self) -> broadcast::Receiver<Option<E::Record>> {
        self.selection_events.subscribe()
    }

    fn refresh_selection(&self, rows: &[E::Record]) {
        let mut selection = self.lock_selection();
        let Some(id) = selection.as_ref().map(Record::id) else {
            return;
        };
        let fresh = rows.iter().find(|row| row.id() == id).cloned();
        if fresh.is_none() {
            debug!(list = self.descriptor.name(), id, "selected row left the page");
        }
        self.replace_selection(&mut selection, fresh);
    }

    fn replace_selection(
        &self,
        selection: &mut MutexGuard<'_, Option<E::Record>>,
        next: Option<E::Record>,
    ) {
        if **selection != next {
            **selection = next;
            let _ = self.selection_events.send((**selection).clone());
        }
    }

    pub fn find_record(&self, id: i64) -> Option<E::Record> {
        self.content
            .borrow()
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }

    pub fn state(&self) -> ListState<E::Record> {
        ListState {
            loading: *self.loading.borrow(),
            total_count: *self.count.borrow(),
            page: self.content.borrow().clone(),
            selection: self.selection(),
        }
    }

    pub fn phase(&self) -> ListPhase {
        if *self.loading.borrow() {
            ListPhase::Loading
        } else {
            ListPhase::Idle
        }
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_count(&self) -> watch::Receiver<u64> {
        self.count.subscribe()
    }

    pub fn subscribe_content(&self) -> watch::Receiver<Vec<E::Record>> {
        self.content.subscribe()
    }

    pub fn loading_stream(&self) -> WatchStream<bool> {
        WatchStream::new(self.subscribe_loading())
    }

    pub fn count_stream(&self) -> WatchStream<u64> {
        WatchStream::new(self.subscribe_count())
    }

    pub fn content_stream(&self) -> WatchStream<Vec<E::Record>> {
        WatchStream::new(self.subscribe_content())
    }

    pub fn descriptor(&self) -> &Arc<E> {
        &self.descriptor
    }

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_selection(&self) -> MutexGuard<'_, Option<E::Record>> {
        self.selection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/data_source_tests.rs"]
mod tests;
