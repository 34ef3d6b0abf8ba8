/// Album domain types
use super::Track;
use crate::ids::slugify;
use serde::{Deserialize, Serialize};

/// Album derived from the track set, keyed by `(album, album_artist)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    /// Slug of the album key
    pub id: String,
    pub name: String,
    /// Album artist shared by every track of the album
    pub artist: String,
    /// Earliest non-zero year among the album's tracks
    pub year: u32,
    /// First cover art found among the album's tracks
    pub cover_art: Option<String>,
    pub track_count: usize,
    /// Sum of track durations in seconds
    pub total_duration: f64,
}

/// Composite lookup key of the album a track belongs to
pub fn album_key(track: &Track) -> String {
    format!("{}---{}", track.album, track.album_artist)
}

impl Album {
    /// Start an album from its first track
    pub fn from_track(track: &Track) -> Self {
        Self {
            id: slugify(&album_key(track)),
            name: track.album.clone(),
            artist: track.album_artist.clone(),
            year: track.year,
            cover_art: track.cover_art.clone(),
            track_count: 1,
            total_duration: track.duration,
        }
    }

    /// Fold another track of the same album into the aggregates
    pub fn absorb(&mut self, track: &Track) {
        self.track_count += 1;
        self.total_duration += track.duration;
        if self.cover_art.is_none() {
            self.cover_art.clone_from(&track.cover_art);
        }
        if track.year > 0 && (self.year == 0 || track.year < self.year) {
            self.year = track.year;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawTrack, TrackSource};

    fn track(path: &str, year: u32, cover: Option<&str>) -> Track {
        RawTrack {
            album: Some("Kind of Blue".into()),
            artist: Some("Miles Davis".into()),
            year: Some(year),
            duration: Some(300.0),
            cover_art: cover.map(String::from),
            ..RawTrack::default()
        }
        .normalize(path, "t", TrackSource::Local)
    }

    #[test]
    fn absorb_keeps_earliest_nonzero_year_and_first_cover() {
        let mut album = Album::from_track(&track("/a", 0, None));
        album.absorb(&track("/b", 1961, Some("/covers/1.jpg")));
        album.absorb(&track("/c", 1959, Some("/covers/2.jpg")));

        assert_eq!(album.year, 1959);
        assert_eq!(album.cover_art.as_deref(), Some("/covers/1.jpg"));
        assert_eq!(album.track_count, 3);
        assert_eq!(album.total_duration, 900.0);
        assert_eq!(album.id, "kind-of-blue---miles-davis");
    }
}
