//! 遮盖图

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::RenderError;

/// 覆盖在命中区域上的图像
#[derive(Debug, Clone)]
pub enum CoverImage {
    /// 按区域尺寸独立拉伸 x / y 的位图
    Bitmap(RgbaImage),
    /// 纯色填充
    Solid(Rgba<u8>),
}

impl Default for CoverImage {
    fn default() -> Self {
        CoverImage::Solid(Rgba([0, 0, 0, 255]))
    }
}

impl CoverImage {
    pub fn from_image(img: &DynamicImage) -> Self {
        CoverImage::Bitmap(img.to_rgba8())
    }

    /// 从编码后的图片数据加载
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        let img = image::load_from_memory(bytes).map_err(RenderError::Decode)?;
        log::info!("[Cover] 加载遮盖图: {}x{}", img.width(), img.height());
        Ok(Self::from_image(&img))
    }

    /// 拉伸到目标尺寸（不保持宽高比）
    pub fn scaled(&self, width: u32, height: u32) -> RgbaImage {
        match self {
            CoverImage::Bitmap(img) => imageops::resize(img, width, height, FilterType::Triangle),
            CoverImage::Solid(color) => RgbaImage::from_pixel(width, height, *color),
        }
    }
}
