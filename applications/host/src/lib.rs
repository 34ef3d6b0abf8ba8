//! Aurora host
//!
//! Serves the library, playback core and local media files to the UI over
//! HTTP. Everything the UI asks for goes through `POST /ipc`; audio bytes come
//! from `GET /media/*path` with byte-range support.
//!
//! This library exposes the host components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod ipc;
pub mod services;
pub mod state;

pub use api::create_router;
pub use config::HostConfig;
pub use error::{HostError, Result};
pub use ipc::{IpcRequest, IpcResponse};
pub use state::AppState;
