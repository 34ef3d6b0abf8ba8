//! Sorting and searching over the library

use aurora_core::types::{Album, Track};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Track list orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSortOrder {
    #[default]
    Title,
    Artist,
    Album,
    /// Newest first
    Year,
    /// Shortest first
    Duration,
}

/// Album grid orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumSortOrder {
    #[default]
    Name,
    Artist,
    /// Newest first
    Year,
    /// Most tracks first
    Tracks,
}

/// Lowercase `input` and strip accents from Latin letters
pub fn fold_for_search(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
            'ç' | 'ć' | 'č' => 'c',
            'ď' => 'd',
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
            'ñ' | 'ń' | 'ň' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ō' | 'ő' => 'o',
            'ř' => 'r',
            'ś' | 'š' | 'ş' => 's',
            'ť' | 'ţ' => 't',
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
            'ý' | 'ÿ' => 'y',
            'ź' | 'ż' | 'ž' => 'z',
            other => other,
        })
        .collect()
}

fn text_cmp(a: &str, b: &str) -> Ordering {
    fold_for_search(a).cmp(&fold_for_search(b))
}

/// Tracks whose title, artist or album contains `query`
pub fn search_tracks<'a>(tracks: &'a [Track], query: &str) -> Vec<&'a Track> {
    let q = fold_for_search(query.trim());
    if q.is_empty() {
        return tracks.iter().collect();
    }
    tracks
        .iter()
        .filter(|t| {
            fold_for_search(&t.title).contains(&q)
                || fold_for_search(&t.artist).contains(&q)
                || fold_for_search(&t.album).contains(&q)
        })
        .collect()
}

pub fn sort_tracks(tracks: &mut [Track], order: TrackSortOrder) {
    match order {
        TrackSortOrder::Title => tracks.sort_by(|a, b| text_cmp(&a.title, &b.title)),
        TrackSortOrder::Artist => tracks.sort_by(|a, b| {
            text_cmp(&a.artist, &b.artist)
                .then_with(|| text_cmp(&a.album, &b.album))
                .then(a.track.cmp(&b.track))
        }),
        TrackSortOrder::Album => tracks.sort_by(|a, b| {
            text_cmp(&a.album, &b.album)
                .then(a.disc.cmp(&b.disc))
                .then(a.track.cmp(&b.track))
        }),
        TrackSortOrder::Year => tracks.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| text_cmp(&a.title, &b.title))
        }),
        TrackSortOrder::Duration => tracks.sort_by(|a, b| a.duration.total_cmp(&b.duration)),
    }
}

pub fn sort_albums(albums: &mut [Album], order: AlbumSortOrder) {
    match order {
        AlbumSortOrder::Name => albums.sort_by(|a, b| text_cmp(&a.name, &b.name)),
        AlbumSortOrder::Artist => albums.sort_by(|a, b| {
            text_cmp(&a.artist, &b.artist).then_with(|| text_cmp(&a.name, &b.name))
        }),
        AlbumSortOrder::Year => albums.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| text_cmp(&a.name, &b.name))
        }),
        AlbumSortOrder::Tracks => albums.sort_by(|a, b| {
            b.track_count
                .cmp(&a.track_count)
                .then_with(|| text_cmp(&a.name, &b.name))
        }),
    }
}

/// Album tracks in play order: disc, then track number
pub fn sort_album_tracks(tracks: &mut [Track]) {
    tracks.sort_by(|a, b| a.disc.cmp(&b.disc).then(a.track.cmp(&b.track)));
}
