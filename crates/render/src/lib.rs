//! Raster redaction: paint a cover image over located regions.

mod cover;
mod output;
mod redact;

pub use cover::CoverImage;
pub use output::{
    decode_image, encode_png, output_file_name, render_redacted, RedactedImage, OUTPUT_EXTENSION,
    OUTPUT_MIME,
};
pub use redact::redact;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}
