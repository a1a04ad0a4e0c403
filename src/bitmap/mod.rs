//! Bitmaps: texel storage, colour encodings and filtered 2-D textures.

mod colour_encoding;
mod texel_storage;
mod texture2d;

pub use colour_encoding::*;
pub use texel_storage::*;
pub use texture2d::*;
