pub mod catalog;
pub mod config;
pub mod platform;
pub mod recent;
pub mod recommend;
pub mod session;

pub use catalog::{Catalog, Genre, Track};
pub use config::Config;
pub use recent::RecentList;
pub use session::{Command, Direction, PlaybackStatus, SessionState};
