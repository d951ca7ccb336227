//! Rollback discipline shared by every store operation:
//! snapshot, optimistic apply, remote call, commit or rollback, clear loading.

use super::{Cached, Store, StoreState};
use crate::entity::{temp_id, Entity};
use crate::error::StoreError;
use crate::remote::RemoteCollection;
use chrono::Utc;
use finflow_api::ApiError;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

/// Marks one operation as in flight for as long as it lives. Dropping it
/// (on success, failure or when the future is cancelled) releases the count.
pub(crate) struct InFlight<'a> {
    state: &'a Mutex<StoreState>,
}

impl<'a> InFlight<'a> {
    /// Count the operation and clear the previous error.
    pub(crate) fn begin(state: &'a Mutex<StoreState>) -> Self {
        let mut s = state.lock().unwrap_or_else(PoisonError::into_inner);
        s.in_flight += 1;
        s.error = None;
        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        s.in_flight = s.in_flight.saturating_sub(1);
    }
}

impl<R> Store<R> {
    /// Undo the optimistic change and publish the error under one lock, so no
    /// reader sees the error next to data that is about to be reverted.
    pub(crate) fn fail<F>(&self, err: ApiError, verb: &str, noun: &str, rollback: F) -> StoreError
    where
        F: FnOnce(&mut StoreState),
    {
        let err = StoreError::remote(err, verb, noun);
        tracing::error!("Failed to {} {}: {}", verb, noun, err);
        self.with_state(|s| {
            rollback(s);
            s.error = Some(err.message().to_string());
        });
        err
    }

    /// Fetch-and-store for reads that have no optimistic phase.
    pub(crate) async fn run_fetch<T, Fut, F>(
        &self,
        noun: &str,
        fetch: Fut,
        store: F,
    ) -> Result<(), StoreError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
        F: FnOnce(&mut StoreState, T),
    {
        let _guard = InFlight::begin(&self.state);
        tracing::info!("Loading {}", noun);
        match fetch.await {
            Ok(value) => {
                self.with_state(|s| store(s, value));
                tracing::debug!("Loaded {}", noun);
                Ok(())
            }
            Err(e) => Err(self.fail(e, "load", noun, |_| {})),
        }
    }

    pub(crate) async fn run_load<E>(&self, filter: E::Filter) -> Result<(), StoreError>
    where
        E: Cached,
        R: RemoteCollection<E>,
    {
        let _guard = InFlight::begin(&self.state);
        tracing::info!("Loading {}", E::PLURAL);
        match RemoteCollection::<E>::list(&*self.remote, filter).await {
            Ok(items) => {
                tracing::info!("Loaded {} {}", items.len(), E::PLURAL);
                self.with_state(|s| E::collection_mut(s).replace_all(items));
                Ok(())
            }
            Err(e) => Err(self.fail(e, "load", E::PLURAL, |_| {})),
        }
    }

    pub(crate) async fn run_create<E>(&self, draft: E::Draft) -> Result<E, StoreError>
    where
        E: Cached,
        R: RemoteCollection<E>,
    {
        let _guard = InFlight::begin(&self.state);
        let temp_id = temp_id();
        let tentative = E::tentative(temp_id.clone(), &draft, Utc::now());
        self.with_state(|s| E::collection_mut(s).insert_tentative(tentative));
        tracing::debug!("Optimistically added {} {}", E::NOUN, temp_id);

        match RemoteCollection::<E>::create(&*self.remote, draft).await {
            Ok(entity) => {
                tracing::info!("Created {} {}", E::NOUN, entity.id());
                self.with_state(|s| {
                    E::collection_mut(s).commit_tentative(&temp_id, entity.clone())
                });
                Ok(entity)
            }
            Err(e) => Err(self.fail(e, "create", E::NOUN, |s| {
                let removed = E::collection_mut(s).remove_tentatives();
                tracing::debug!("Removed {} tentative {}", removed, E::PLURAL);
            })),
        }
    }

    pub(crate) async fn run_update<E>(&self, id: &str, patch: E::Patch) -> Result<E, StoreError>
    where
        E: Cached,
        R: RemoteCollection<E>,
    {
        let _guard = InFlight::begin(&self.state);
        let pending = self.with_state(|s| E::collection_mut(s).begin_update(id, &patch));
        tracing::debug!("Optimistically updated {} {}", E::NOUN, id);

        match RemoteCollection::<E>::update(&*self.remote, id.to_string(), patch).await {
            Ok(entity) => {
                tracing::info!("Updated {} {}", E::NOUN, id);
                let applied = self.with_state(|s| {
                    E::collection_mut(s).commit(id, pending.stamp(), Some(entity.clone()))
                });
                if !applied {
                    tracing::warn!("Newer change to {} {} takes precedence", E::NOUN, id);
                }
                Ok(entity)
            }
            Err(e) => Err(self.fail(e, "update", E::NOUN, |s| {
                if !E::collection_mut(s).rollback(id, pending) {
                    tracing::warn!("Newer change to {} {} takes precedence", E::NOUN, id);
                }
            })),
        }
    }

    pub(crate) async fn run_delete<E>(&self, id: &str) -> Result<(), StoreError>
    where
        E: Cached,
        R: RemoteCollection<E>,
    {
        let _guard = InFlight::begin(&self.state);
        let pending = self.with_state(|s| E::collection_mut(s).begin_delete(id));
        tracing::debug!("Optimistically removed {} {}", E::NOUN, id);

        match RemoteCollection::<E>::delete(&*self.remote, id.to_string()).await {
            Ok(()) => {
                tracing::info!("Deleted {} {}", E::NOUN, id);
                self.with_state(|s| E::collection_mut(s).commit(id, pending.stamp(), None));
                Ok(())
            }
            Err(e) => Err(self.fail(e, "delete", E::NOUN, |s| {
                if !E::collection_mut(s).rollback(id, pending) {
                    tracing::warn!("Newer change to {} {} takes precedence", E::NOUN, id);
                }
            })),
        }
    }
}
