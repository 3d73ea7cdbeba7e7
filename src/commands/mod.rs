pub mod auth;
pub mod cache;
pub mod inbox;
pub mod mark;
pub mod serve;
pub mod settings;
pub mod watch;
