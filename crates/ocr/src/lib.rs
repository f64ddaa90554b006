//! OCR 引擎接入
//!
//! 提供统一的识别接口，输出 块 → 段落 → 行 → 单词 → 字符 的识别树：
//! - Tesseract OCR (CLI, TSV 输出)
//! - 离线识别结果 (`.ocr.json`)

mod engine;
mod error;
mod sidecar;
mod tesseract;
mod types;

pub use engine::OcrEngine;
pub use error::OcrError;
pub use sidecar::{sidecar_path, SidecarEngine};
pub use tesseract::{parse_tesseract_tsv, tesseract_langs, tesseract_version, TesseractEngine};
pub use types::{OcrEngineType, Recognition, TesseractConfig};

/// 按类型创建 OCR 引擎
pub fn create_engine(
    engine_type: OcrEngineType,
    tesseract: &TesseractConfig,
) -> Result<Box<dyn OcrEngine>, OcrError> {
    log::info!("[OCR] 初始化引擎: {}", engine_type);
    let engine: Box<dyn OcrEngine> = match engine_type {
        OcrEngineType::Tesseract => Box::new(TesseractEngine::new(tesseract.clone())?),
        OcrEngineType::Sidecar => Box::new(SidecarEngine::new()),
    };
    Ok(engine)
}
