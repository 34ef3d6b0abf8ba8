mod album;
mod artist;
mod playback_state;
mod playlist;
mod track;

pub use album::{album_key, Album};
pub use artist::{artist_name, Artist};
pub use playback_state::{PlaybackErrorKind, PlaybackStatus, RepeatMode};
pub use playlist::{Playlist, RuleField, RuleMatch, RuleOperator, RuleValue, SmartRule};
pub use track::{
    normalize_duration, RawTrack, Track, TrackCredits, TrackSource, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
    UNKNOWN_TITLE,
};
