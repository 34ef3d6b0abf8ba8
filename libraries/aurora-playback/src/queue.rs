//! Play queue with a cursor and a shadow original order
//!
//! Every entry gets a queue-unique `entry_id`, so the same track can appear
//! twice and the cursor still follows the right one. The shadow order is what
//! un-shuffling restores: while unshuffled it mirrors the queue exactly, while
//! shuffled it receives the same inserts and removals by identity.
//!
//! ```text
//! entries:   [C] A  D  B      cursor → C (shuffled, current at 0)
//! original:   A  B  C  D      restored on unshuffle, cursor → C at 2
//! ```

use crate::error::{PlaybackError, Result};
use crate::shuffle::shuffle_keeping_first;
use aurora_core::Track;
use rand::Rng;
use serde::Serialize;

/// Queue-unique entry identity
pub type EntryId = u64;

/// One slot in the queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub entry_id: EntryId,
    pub track: Track,
}

/// Result of removing an entry
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEntry {
    pub entry: QueueEntry,
    /// The removed entry was under the cursor
    pub was_current: bool,
}

/// Ordered queue with a cursor that is `None` iff the queue is empty
#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    entries: Vec<QueueEntry>,
    original: Vec<QueueEntry>,
    current: Option<usize>,
    shuffled: bool,
    next_id: EntryId,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self, track: Track) -> QueueEntry {
        self.next_id += 1;
        QueueEntry {
            entry_id: self.next_id,
            track,
        }
    }

    // ===== Queries =====

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Order that un-shuffling restores
    pub fn original_order(&self) -> &[QueueEntry] {
        &self.original
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.entries.iter().map(|e| &e.track)
    }

    pub fn get(&self, index: usize) -> Option<&QueueEntry> {
        self.entries.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current().map(|e| &e.track)
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Whether a later entry exists without wrapping
    pub fn has_next(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.entries.len())
    }

    /// Whether an earlier entry exists without wrapping
    pub fn has_previous(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            })
        }
    }

    // ===== Structure =====

    /// Replace everything with `tracks`, cursor at `start` (clamped)
    pub fn replace(&mut self, tracks: Vec<Track>, start: usize) {
        let entries: Vec<QueueEntry> = tracks.into_iter().map(|t| self.mint(t)).collect();
        self.current = if entries.is_empty() {
            None
        } else {
            Some(start.min(entries.len() - 1))
        };
        self.original = entries.clone();
        self.entries = entries;
        self.shuffled = false;
    }

    /// Append to the end; returns the index of the first appended entry
    pub fn append(&mut self, tracks: Vec<Track>) -> usize {
        let first = self.entries.len();
        for track in tracks {
            let entry = self.mint(track);
            self.original.push(entry.clone());
            self.entries.push(entry);
        }
        if self.current.is_none() && !self.entries.is_empty() {
            self.current = Some(first);
        }
        first
    }

    /// Insert right after the cursor; returns the new entry's index
    pub fn insert_after_current(&mut self, track: Track) -> usize {
        let entry = self.mint(track);
        let Some(cur) = self.current else {
            self.original.push(entry.clone());
            self.entries.push(entry);
            self.current = Some(0);
            return 0;
        };

        let at = cur + 1;
        let shadow_at = if self.shuffled {
            let cur_id = self.entries[cur].entry_id;
            self.original
                .iter()
                .position(|e| e.entry_id == cur_id)
                .map_or(self.original.len(), |p| p + 1)
        } else {
            at
        };

        self.entries.insert(at, entry.clone());
        self.original.insert(shadow_at, entry);
        at
    }

    /// Remove the entry at `index`
    ///
    /// Removing the current entry leaves the cursor on the entry that slid
    /// into its place, wrapping to the start when it was the last one.
    pub fn remove(&mut self, index: usize) -> Result<RemovedEntry> {
        self.check_index(index)?;

        let entry = self.entries.remove(index);
        self.original.retain(|e| e.entry_id != entry.entry_id);

        let was_current = self.current == Some(index);
        self.current = match self.current {
            _ if self.entries.is_empty() => None,
            Some(cur) if cur == index => Some(if cur >= self.entries.len() { 0 } else { cur }),
            Some(cur) if index < cur => Some(cur - 1),
            other => other,
        };

        Ok(RemovedEntry { entry, was_current })
    }

    /// Move the entry at `from` to `to`; the cursor follows its entry
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        self.check_index(from)?;
        self.check_index(to)?;

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        if !self.shuffled {
            let shadow = self.original.remove(from);
            self.original.insert(to, shadow);
        }

        if let Some(cur) = self.current {
            self.current = Some(if cur == from {
                to
            } else if from < cur && to >= cur {
                cur - 1
            } else if from > cur && to <= cur {
                cur + 1
            } else {
                cur
            });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.original.clear();
        self.current = None;
        self.shuffled = false;
    }

    // ===== Cursor =====

    /// Point the cursor at `index`
    pub fn select(&mut self, index: usize) -> Result<&QueueEntry> {
        self.check_index(index)?;
        self.current = Some(index);
        Ok(&self.entries[index])
    }

    /// Step forward, wrapping to the start when `wrap` is set
    pub fn advance(&mut self, wrap: bool) -> Option<usize> {
        let cur = self.current?;
        let next = if cur + 1 < self.entries.len() {
            cur + 1
        } else if wrap {
            0
        } else {
            return None;
        };
        self.current = Some(next);
        Some(next)
    }

    /// Step back, wrapping to the end when `wrap` is set
    pub fn retreat(&mut self, wrap: bool) -> Option<usize> {
        let cur = self.current?;
        let prev = if cur > 0 {
            cur - 1
        } else if wrap {
            self.entries.len() - 1
        } else {
            return None;
        };
        self.current = Some(prev);
        Some(prev)
    }

    // ===== Shuffle =====

    /// Snapshot the order and shuffle with the current entry first
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.shuffled {
            return;
        }
        self.original = self.entries.clone();
        let entries = std::mem::take(&mut self.entries);
        self.entries = shuffle_keeping_first(entries, self.current, rng);
        self.shuffled = true;
        if !self.entries.is_empty() {
            self.current = Some(0);
        }
    }

    /// Restore the snapshot and relocate the cursor by identity
    pub fn unshuffle(&mut self) {
        if !self.shuffled {
            return;
        }
        let current_id = self.current().map(|e| e.entry_id);
        self.entries = self.original.clone();
        self.shuffled = false;
        self.current = current_id
            .and_then(|id| self.entries.iter().position(|e| e.entry_id == id))
            .or(if self.entries.is_empty() { None } else { Some(0) });
    }
}
