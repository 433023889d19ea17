pub mod color;
pub mod error;
pub mod types;

pub use color::parse_hex_color;
pub use error::{Result, TextliftError};
pub use types::{
    full_text, ExtractResponse, TextBlock, UpdateImageRequest, UpdateImageResponse,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
};
