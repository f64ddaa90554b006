//! 离线识别结果引擎
//!
//! 从图片旁的 `<文件名>.ocr.json` 读取预先生成的识别树，
//! 用于没有安装 OCR 引擎的环境和测试。

use image::DynamicImage;
use std::path::{Path, PathBuf};

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::Recognition;

const SIDECAR_SUFFIX: &str = ".ocr.json";

#[derive(Debug, Default)]
pub struct SidecarEngine;

impl SidecarEngine {
    pub fn new() -> Self {
        Self
    }
}

/// 图片对应的识别结果文件路径
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_os_string();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

impl OcrEngine for SidecarEngine {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    fn recognize_image(&mut self, _img: &DynamicImage) -> Result<Recognition, OcrError> {
        Err(OcrError::Unavailable(
            "sidecar 引擎需要图片文件路径".to_string(),
        ))
    }

    fn recognize_file(&mut self, image_path: &Path) -> Result<Recognition, OcrError> {
        let path = sidecar_path(image_path);
        log::debug!("[Sidecar] 读取识别结果: {}", path.display());

        let raw = std::fs::read_to_string(&path)?;
        let recognition = Recognition::from_json(&raw)?;

        log::info!(
            "[Sidecar] {} 包含 {} 个块",
            path.display(),
            recognition.block_count()
        );
        Ok(recognition)
    }
}
