//! Session state: the fetched concert list plus the user's attendance and
//! recent-search lists.
//!
//! One [`ConcertStore`] is constructed per running application and shared by
//! reference with whatever UI layer needs it. Attendance and recent searches are
//! written through to [`LocalStorage`] at the end of every mutation and read
//! back when the store is built.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::models::ConcertRecord;
use crate::normalize::normalize_value;
use crate::source::{ConcertSource, SourceBatch};
use crate::state::{AttendanceSet, RecentSearches};
use crate::storage::{self, LocalStorage, ATTENDANCE_KEY, RECENT_SEARCHES_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    #[default]
    Idle,
    InFlight,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub concert_count: usize,
    pub loading: bool,
    pub last_error: Option<String>,
    pub phase: FetchPhase,
    pub attending_count: usize,
}

#[derive(Default)]
struct StoreState {
    concerts: Vec<ConcertRecord>,
    loading: bool,
    last_error: Option<String>,
    phase: FetchPhase,
    completed_fetches: u64,
    attendance: AttendanceSet,
    recent: RecentSearches,
}

pub struct ConcertStore {
    state: Mutex<StoreState>,
    storage: Arc<dyn LocalStorage>,
    source: ConcertSource,
    fetch_gate: AsyncMutex<()>,
}

impl ConcertStore {
    /// Builds the store and rehydrates persisted lists. Never fails: unreadable
    /// entries start out empty.
    pub fn new(storage: Arc<dyn LocalStorage>, source: ConcertSource) -> Self {
        let attendance =
            AttendanceSet::from_ids(storage::load_list(storage.as_ref(), ATTENDANCE_KEY));
        let recent =
            RecentSearches::from_cities(storage::load_list(storage.as_ref(), RECENT_SEARCHES_KEY));
        tracing::debug!(
            attending = attendance.len(),
            recent = recent.cities().len(),
            "rehydrated concert store"
        );
        Self {
            state: Mutex::new(StoreState {
                attendance,
                recent,
                ..StoreState::default()
            }),
            storage,
            source,
            fetch_gate: AsyncMutex::new(()),
        }
    }

    // A poisoned lock still holds consistent data: every mutation completes
    // before the guard drops.
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn concerts(&self) -> Vec<ConcertRecord> {
        self.state().concerts.clone()
    }

    pub fn concert(&self, id: &str) -> Option<ConcertRecord> {
        self.state()
            .concerts
            .iter()
            .find(|concert| concert.id == id)
            .cloned()
    }

    pub fn concerts_in_city(&self, city: &str) -> Vec<ConcertRecord> {
        self.state()
            .concerts
            .iter()
            .filter(|concert| concert.city == city)
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    pub fn fetch_phase(&self) -> FetchPhase {
        self.state().phase
    }

    pub fn attending_count(&self) -> usize {
        self.state().attendance.len()
    }

    pub fn is_attending(&self, id: &str) -> bool {
        self.state().attendance.contains(id)
    }

    pub fn attending_ids(&self) -> Vec<String> {
        self.state().attendance.ids().to_vec()
    }

    pub fn recent_searches(&self) -> Vec<String> {
        self.state().recent.cities().to_vec()
    }

    /// Distinct cities of the current list in ascending order.
    pub fn available_cities(&self) -> Vec<String> {
        self.state()
            .concerts
            .iter()
            .map(|concert| concert.city.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn snapshot(&self) -> StoreStatus {
        let state = self.state();
        StoreStatus {
            concert_count: state.concerts.len(),
            loading: state.loading,
            last_error: state.last_error.clone(),
            phase: state.phase,
            attending_count: state.attendance.len(),
        }
    }

    /// Loads the concert list from the configured source, once per session.
    ///
    /// Returns immediately when concerts are already loaded. Callers that arrive
    /// while a fetch is in flight wait for it and share its outcome instead of
    /// issuing a second request. Failures land in [`Self::last_error`] and leave
    /// the list empty, so a later call retries.
    pub async fn fetch_concerts(&self) {
        let seen = {
            let state = self.state();
            if !state.concerts.is_empty() {
                tracing::debug!("concerts already loaded, skipping fetch");
                return;
            }
            state.completed_fetches
        };

        let _gate = self.fetch_gate.lock().await;
        {
            let mut state = self.state();
            if !state.concerts.is_empty() || state.completed_fetches != seen {
                tracing::debug!("joined a fetch that was already in flight");
                return;
            }
            state.loading = true;
            state.last_error = None;
            state.phase = FetchPhase::InFlight;
        }

        tracing::info!(source = self.source.name(), "fetching concerts");
        let outcome = self.source.load().await;

        let mut state = self.state();
        match outcome {
            Ok(batch) => {
                state.concerts = collect_concerts(batch);
                tracing::info!(count = state.concerts.len(), "concerts loaded");
            }
            Err(err) => {
                tracing::warn!(error = %err, "concert fetch failed");
                state.concerts.clear();
                state.last_error = Some(err.to_string());
            }
        }
        state.loading = false;
        state.completed_fetches += 1;
        state.phase = if state.concerts.is_empty() {
            FetchPhase::Idle
        } else {
            FetchPhase::Done
        };
    }

    /// Adds `id` to the attendance list, or removes it if already there.
    /// Returns whether the user is now attending.
    pub fn toggle_attendance(&self, id: &str) -> bool {
        let mut state = self.state();
        let attending = state.attendance.toggle(id);
        if let Err(err) =
            storage::save_list(self.storage.as_ref(), ATTENDANCE_KEY, state.attendance.ids())
        {
            tracing::warn!(error = %err, "failed to persist attendance list");
        }
        attending
    }

    pub fn record_city_search(&self, city: &str) {
        let mut state = self.state();
        if !state.recent.record(city) {
            return;
        }
        if let Err(err) =
            storage::save_list(self.storage.as_ref(), RECENT_SEARCHES_KEY, state.recent.cities())
        {
            tracing::warn!(error = %err, "failed to persist recent searches");
        }
    }
}

/// Normalizes a source batch and keeps only concerts that can be placed on a map.
fn collect_concerts(batch: SourceBatch) -> Vec<ConcertRecord> {
    let records: Vec<ConcertRecord> = match batch {
        SourceBatch::Raw(events) => events
            .into_iter()
            .filter_map(|event| match normalize_value(event) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed event");
                    None
                }
            })
            .collect(),
        SourceBatch::Records(records) => records,
    };
    let total = records.len();
    let located: Vec<ConcertRecord> = records
        .into_iter()
        .filter(ConcertRecord::has_location)
        .collect();
    if located.len() < total {
        tracing::debug!(dropped = total - located.len(), "dropped concerts without coordinates");
    }
    located
}
