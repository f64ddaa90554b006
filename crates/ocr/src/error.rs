//! OCR 错误类型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR 引擎不可用: {0}")]
    Unavailable(String),

    #[error("OCR 执行失败: {0}")]
    Execution(String),

    #[error("识别结果格式错误: {0}")]
    Malformed(String),

    #[error("图像处理失败: {0}")]
    ImageProcess(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
}
