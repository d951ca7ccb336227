use crate::entity::{is_tentative, Entity};
use std::collections::HashMap;

/// Version token captured when an optimistic change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp(u64);

/// An optimistic update or delete waiting for the server.
#[derive(Debug, Clone)]
pub struct Pending {
    stamp: Stamp,
}

impl Pending {
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Latest {
    InFlight,
    Committed,
    RolledBack,
}

/// Server-confirmed state of one entity while changes to it are in flight.
#[derive(Debug, Clone)]
struct Track<E> {
    latest: u64,
    state: Latest,
    outstanding: usize,
    /// Last value the server agreed to; `None` once it is known to be gone.
    base: Option<E>,
    /// Confirmed ids above this one, nearest first, for putting it back.
    above: Vec<String>,
}

/// Ordered entities of one kind plus the confirmed state of every entity
/// with an optimistic change in flight.
#[derive(Debug, Clone)]
pub struct Collection<E> {
    items: Vec<E>,
    versions: HashMap<String, Track<E>>,
    next_stamp: u64,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            versions: HashMap::new(),
            next_stamp: 0,
        }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|e| e.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    /// Replace everything with a fresh server read. Outstanding stamps are
    /// invalidated so late settlements cannot resurrect pre-load state.
    pub fn replace_all(&mut self, items: Vec<E>) {
        self.items = items;
        self.versions.clear();
    }

    fn begin(&mut self, id: &str) -> Stamp {
        let current = self.position(id);
        let above = current.map(|index| self.confirmed_above(index));
        let entity = current.map(|index| self.items[index].clone());

        self.next_stamp += 1;
        let stamp = self.next_stamp;
        let track = self
            .versions
            .entry(id.to_string())
            .or_insert_with(|| Track {
                latest: stamp,
                state: Latest::InFlight,
                outstanding: 0,
                base: entity,
                above: Vec::new(),
            });
        track.latest = stamp;
        track.state = Latest::InFlight;
        track.outstanding += 1;
        if let Some(above) = above {
            track.above = above;
        }
        Stamp(stamp)
    }

    fn confirmed_above(&self, index: usize) -> Vec<String> {
        self.items[..index]
            .iter()
            .rev()
            .filter(|e| !is_tentative(e.id()))
            .map(|e| e.id().to_string())
            .collect()
    }

    /// Merge `patch` into the entity in place. The stamp is taken even when
    /// the entity is missing so the settlement still has something to match.
    pub fn begin_update(&mut self, id: &str, patch: &E::Patch) -> Pending {
        let stamp = self.begin(id);
        if let Some(index) = self.position(id) {
            self.items[index].apply(patch);
        }
        Pending { stamp }
    }

    pub fn begin_delete(&mut self, id: &str) -> Pending {
        let stamp = self.begin(id);
        if let Some(index) = self.position(id) {
            self.items.remove(index);
        }
        Pending { stamp }
    }

    /// Accept the server's outcome: `Some` is the entity as the server now
    /// has it, `None` means it is gone (delete).
    ///
    /// Returns `false` when a newer change to the same id was started after
    /// `stamp`. The older result then only shows if that newer change has
    /// already been rolled back.
    pub fn commit(&mut self, id: &str, stamp: Stamp, confirmed: Option<E>) -> bool {
        let Some(mut track) = self.versions.remove(id) else {
            return false;
        };
        let latest = track.latest == stamp.0;
        match (latest, track.state) {
            (true, _) | (false, Latest::RolledBack) => {
                self.show(id, confirmed.clone(), &track);
                track.base = confirmed;
                if latest {
                    track.state = Latest::Committed;
                }
            }
            (false, Latest::InFlight) => track.base = confirmed,
            (false, Latest::Committed) => {}
        }
        self.release(id, track);
        latest
    }

    /// Undo the change behind `pending` by restoring the last confirmed
    /// entity. No-op when a newer change to the same id is in flight or done.
    pub fn rollback(&mut self, id: &str, pending: Pending) -> bool {
        let Some(mut track) = self.versions.remove(id) else {
            return false;
        };
        let latest = track.latest == pending.stamp.0;
        if latest {
            self.show(id, track.base.clone(), &track);
            track.state = Latest::RolledBack;
        }
        self.release(id, track);
        latest
    }

    fn release(&mut self, id: &str, mut track: Track<E>) {
        track.outstanding = track.outstanding.saturating_sub(1);
        if track.outstanding > 0 {
            self.versions.insert(id.to_string(), track);
        }
    }

    /// Make the visible entity for `id` match `entity`, keeping its current
    /// position, or re-inserting it below its anchor.
    fn show(&mut self, id: &str, entity: Option<E>, track: &Track<E>) {
        match (self.position(id), entity) {
            (Some(index), Some(entity)) => self.items[index] = entity,
            (Some(index), None) => {
                self.items.remove(index);
            }
            (None, Some(entity)) => {
                let index = self.insertion_point(track);
                self.items.insert(index, entity);
            }
            (None, None) => {}
        }
    }

    /// Just below the nearest surviving neighbour, or under the placeholders
    /// when none is left.
    fn insertion_point(&self, track: &Track<E>) -> usize {
        track
            .above
            .iter()
            .find_map(|id| self.position(id))
            .map(|index| index + 1)
            .unwrap_or_else(|| {
                self.items
                    .iter()
                    .take_while(|e| is_tentative(e.id()))
                    .count()
            })
    }

    pub fn insert_tentative(&mut self, entity: E) {
        self.items.insert(0, entity);
    }

    /// Swap the placeholder for the server's entity, keeping its position.
    pub fn commit_tentative(&mut self, temp_id: &str, entity: E) {
        match (self.position(temp_id), self.position(entity.id())) {
            (Some(index), None) => self.items[index] = entity,
            (Some(index), Some(_)) => {
                self.items.remove(index);
            }
            // Placeholder swept away by a failed create or a reload.
            (None, None) => self.items.insert(0, entity),
            (None, Some(_)) => {}
        }
    }

    /// Drop every placeholder. Returns how many were removed.
    pub fn remove_tentatives(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|e| !is_tentative(e.id()));
        before - self.items.len()
    }
}
