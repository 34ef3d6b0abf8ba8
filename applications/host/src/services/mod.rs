/// Host services
pub mod media_server;
pub mod player;

pub use player::{HostResolver, PlayerService};
