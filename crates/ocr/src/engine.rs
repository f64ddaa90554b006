//! OCR 引擎 trait 定义

use crate::error::OcrError;
use crate::types::Recognition;
use image::DynamicImage;
use std::path::Path;

/// OCR 引擎统一 trait
///
/// 单个实例不保证可并发识别，调用方需要自行串行化访问。
pub trait OcrEngine: Send {
    /// 引擎标识
    fn name(&self) -> &'static str;

    /// 识别图片
    fn recognize_image(&mut self, img: &DynamicImage) -> Result<Recognition, OcrError>;

    /// 识别图片文件
    fn recognize_file(&mut self, image_path: &Path) -> Result<Recognition, OcrError> {
        let img = image::open(image_path)
            .map_err(|e| OcrError::ImageProcess(format!("打开图片失败: {}", e)))?;
        self.recognize_image(&img)
    }

    /// 释放引擎资源
    fn terminate(&mut self) {}
}
