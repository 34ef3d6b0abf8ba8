//! Aurora Subsonic Client
//!
//! Client for Subsonic-compatible music servers (Navidrome, Airsonic, ...).
//!
//! # Features
//!
//! - **Authentication**: salted-token auth by default, hex-encoded legacy auth on request
//! - **Library fetch**: albums paged via `getAlbumList2`, songs per album via `getAlbum`
//! - **Browsing**: artists, artist detail, `search3`
//! - **URLs**: signed stream and cover-art URLs, freshly salted per call
//!
//! Remote songs are mapped into the same [`aurora_core::Track`] shape as local
//! files, with ids `subsonic-<id>` and paths `subsonic://<id>` so they never
//! collide with filesystem paths.

mod auth;
mod client;
mod error;
mod types;

pub use auth::{legacy_password, new_salt, token_for, API_VERSION, CLIENT_NAME};
pub use client::{
    song_id_from_path, SubsonicClient, ALBUM_PAGE_SIZE, DEFAULT_COVER_SIZE, REMOTE_SCHEME,
};
pub use error::{Result, SubsonicError};
pub use types::{SearchResults, SubsonicAlbum, SubsonicArtist, SubsonicConfig, SubsonicSong};
