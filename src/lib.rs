pub mod config;
pub mod discord;
pub mod logging;
pub mod playback;
pub mod presence;
pub mod webhook;
