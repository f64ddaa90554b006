//! 图片解码 / 编码与输出文件命名

use husk_core::Region;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::cover::CoverImage;
use crate::redact::redact;
use crate::RenderError;

/// 输出统一为无损 PNG
pub const OUTPUT_EXTENSION: &str = "png";
pub const OUTPUT_MIME: &str = "image/png";

/// 脱敏后的图片文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedImage {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// 保留原文件名主体，替换扩展名
pub fn output_file_name(source_name: &str) -> String {
    let stem = match source_name.rfind('.') {
        Some(idx) if idx > 0 => &source_name[..idx],
        _ => source_name,
    };
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, RenderError> {
    image::load_from_memory(bytes).map_err(RenderError::Decode)
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(bytes)
}

/// 遮盖已解码的图片并编码为新文件
pub fn render_redacted(
    source_name: &str,
    source: &DynamicImage,
    regions: &[Region],
    cover: &CoverImage,
) -> Result<RedactedImage, RenderError> {
    let canvas = redact(source, regions, cover);
    let bytes = encode_png(&canvas)?;
    let file_name = output_file_name(source_name);

    log::info!("[Redact] 生成 {} ({} 字节)", file_name, bytes.len());
    Ok(RedactedImage {
        file_name,
        mime: OUTPUT_MIME,
        bytes,
    })
}
