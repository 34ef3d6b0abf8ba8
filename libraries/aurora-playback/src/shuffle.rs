//! Shuffle around the current track
//!
//! The current entry is pulled out, the rest is Fisher-Yates shuffled, and
//! the current entry goes back in front so playback does not jump.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `items`, keeping the element at `keep_first` (if any) at index 0
pub fn shuffle_keeping_first<T, R: Rng + ?Sized>(
    mut items: Vec<T>,
    keep_first: Option<usize>,
    rng: &mut R,
) -> Vec<T> {
    let first = keep_first
        .filter(|&i| i < items.len())
        .map(|i| items.remove(i));

    items.shuffle(rng);

    if let Some(first) = first {
        items.insert(0, first);
    }
    items
}
