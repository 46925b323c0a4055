pub mod api;
pub mod embedded;
pub mod history;
pub mod layout;
pub mod mode;
pub mod phase;
pub mod projection;
pub mod prompt;
pub mod server;
pub mod store;
pub mod tracker;
