//! Shared model, persistence and HTTP clients for the p0dcast player.

pub mod api;
pub mod config;
pub mod model;
pub mod platform;
pub mod playback;
pub mod queue;
pub mod search;
pub mod store;
pub mod timefmt;
