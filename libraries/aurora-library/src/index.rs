//! Derived lookup structures
//!
//! Everything here is a pure function of the track list.

use aurora_core::types::{album_key, artist_name, Album, Artist, Track};
use std::collections::HashMap;

/// Lookup maps and projections derived from a track list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryIndex {
    by_path: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    albums: Vec<Album>,
    album_by_key: HashMap<String, usize>,
    artists: Vec<Artist>,
    artist_by_name: HashMap<String, usize>,
}

impl LibraryIndex {
    /// Build every index from `tracks`
    ///
    /// Albums and artists appear in first-seen order. Artist album counts need
    /// the finished album list, so they are filled in a second pass.
    pub fn build(tracks: &[Track]) -> Self {
        let mut index = Self::default();

        for (pos, track) in tracks.iter().enumerate() {
            index.by_path.insert(track.path.clone(), pos);
            index.by_id.insert(track.id.clone(), pos);

            let key = album_key(track);
            match index.album_by_key.get(&key) {
                Some(&i) => index.albums[i].absorb(track),
                None => {
                    index.album_by_key.insert(key, index.albums.len());
                    index.albums.push(Album::from_track(track));
                }
            }

            let name = artist_name(track);
            match index.artist_by_name.get(name) {
                Some(&i) => index.artists[i].track_count += 1,
                None => {
                    index
                        .artist_by_name
                        .insert(name.to_string(), index.artists.len());
                    index.artists.push(Artist {
                        name: name.to_string(),
                        track_count: 1,
                        album_count: 0,
                    });
                }
            }
        }

        for album in &index.albums {
            if let Some(&i) = index.artist_by_name.get(&album.artist) {
                index.artists[i].album_count += 1;
            }
        }

        index
    }

    pub fn position_of_path(&self, path: &str) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    pub fn position_of_id(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn album_by_key(&self, key: &str) -> Option<&Album> {
        self.album_by_key.get(key).map(|&i| &self.albums[i])
    }

    pub fn album_by_id(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn artist(&self, name: &str) -> Option<&Artist> {
        self.artist_by_name.get(name).map(|&i| &self.artists[i])
    }
}
