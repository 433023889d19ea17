//! Media handling for textlift: the upload store, font lookup, rendering
//! edits onto images, encoding, and the download route.

pub mod encode;
pub mod fonts;
pub mod media_server;
pub mod mime_detect;
pub mod render;
pub mod storage;

pub use encode::{png_data_url, save_image};
pub use fonts::FontBook;
pub use media_server::download_router;
pub use mime_detect::detect_mime_type;
pub use render::{render_edits, RenderOutcome};
pub use storage::{secure_filename, UploadStore};
