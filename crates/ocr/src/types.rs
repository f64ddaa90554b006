//! OCR 共享类型定义

use husk_core::Document;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// OCR 引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineType {
    /// Tesseract OCR (CLI)
    #[default]
    Tesseract,
    /// 读取图片旁的 `.ocr.json` 识别结果
    Sidecar,
}

impl std::fmt::Display for OcrEngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrEngineType::Tesseract => write!(f, "tesseract"),
            OcrEngineType::Sidecar => write!(f, "sidecar"),
        }
    }
}

impl std::str::FromStr for OcrEngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tesseract" => Ok(OcrEngineType::Tesseract),
            "sidecar" => Ok(OcrEngineType::Sidecar),
            other => Err(format!("未知的 OCR 引擎: {}", other)),
        }
    }
}

/// 一次识别的完整结果
///
/// `document` 缺失表示引擎没有返回分块数据，此时无法定位任何区域。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// 全文
    #[serde(default)]
    pub text: String,
    /// 分块识别树
    #[serde(rename = "blocks", default)]
    pub document: Option<Document>,
}

impl Recognition {
    /// 解析层级 JSON 识别结果
    ///
    /// 兼容外层包了一层 `data` 的格式。
    pub fn from_json(raw: &str) -> Result<Self, OcrError> {
        let mut value: serde_json::Value = serde_json::from_str(raw)?;
        if let Some(data) = value.get_mut("data").filter(|d| d.is_object()) {
            value = data.take();
        }
        if !value.is_object() {
            return Err(OcrError::Malformed("识别结果不是 JSON 对象".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn block_count(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.blocks.len())
    }
}

/// Tesseract 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TesseractConfig {
    /// Tesseract 可执行文件路径
    pub binary_path: Option<String>,
    /// tessdata 目录路径
    pub tessdata_path: Option<String>,
    /// 语言（如 "eng"）
    pub lang: Option<String>,
    /// 页面分割模式 (0-13)
    pub psm: Option<u8>,
    /// OCR 引擎模式 (0-3)
    pub oem: Option<u8>,
}

impl TesseractConfig {
    pub fn binary_or_default(&self) -> &str {
        self.binary_path.as_deref().unwrap_or("tesseract")
    }

    pub fn lang_or_default(&self) -> &str {
        self.lang.as_deref().unwrap_or("eng")
    }

    /// 默认全自动分页
    pub fn psm_or_default(&self) -> u8 {
        self.psm.unwrap_or(3)
    }

    pub fn oem_or_default(&self) -> u8 {
        self.oem.unwrap_or(1)
    }
}
