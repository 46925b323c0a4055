//! Embedded dashboard assets, compiled into the binary.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "ui/"]
pub struct Assets;
