//! CLI command implementations.
//!
//! | Module   | Commands handled                         |
//! |----------|------------------------------------------|
//! | `serve`  | `Serve`                                  |
//! | `status` | `Status`, `History`, `Intervene`, `Reset`|

pub mod serve;
pub mod status;

pub use serve::cmd_serve;
pub use status::{cmd_history, cmd_intervene, cmd_reset, cmd_status};
