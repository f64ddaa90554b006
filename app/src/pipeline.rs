//! 单张上传图片的处理流程
//!
//! 解码 → OCR → 全文预检 → 定位区域 → 遮盖并编码。
//! 每张图片的错误只影响它自己，批处理中其它图片照常处理。

use husk_core::{locate, Region};
use husk_ocr::OcrError;
use husk_render::{decode_image, render_redacted, RedactedImage, RenderError};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::context::RedactionContext;

/// 待处理的上传文件
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// 原始文件位置（如有）
    pub path: Option<PathBuf>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            path: None,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Ok(Self {
            file_name,
            bytes,
            path: Some(path.to_path_buf()),
        })
    }

    /// 按文件头判断是否为可识别的图片格式
    pub fn is_image(&self) -> bool {
        image::guess_format(&self.bytes).is_ok()
    }
}

/// 处理结果
#[derive(Debug)]
pub enum Outcome {
    /// 不是图片，原样保留
    Skipped,
    /// 全文没有命中
    Clean,
    /// 全文命中但没能定位到任何区域，原图保留
    Unlocatable,
    Redacted {
        image: RedactedImage,
        regions: Vec<Region>,
    },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Clean => "clean",
            Outcome::Unlocatable => "unlocatable",
            Outcome::Redacted { .. } => "redacted",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("recognition failed: {0}")]
    Recognition(#[from] OcrError),
}

pub fn process_upload(ctx: &RedactionContext, upload: &Upload) -> Result<Outcome, PipelineError> {
    if !upload.is_image() {
        log::debug!("[Pipeline] {} 不是图片，跳过", upload.file_name);
        return Ok(Outcome::Skipped);
    }

    let source = decode_image(&upload.bytes)?;
    let recognition = ctx.recognize(upload.path.as_deref(), &source)?;

    if !ctx.pattern().is_match(&recognition.text) {
        log::info!("[Pipeline] {} 未命中", upload.file_name);
        return Ok(Outcome::Clean);
    }

    let Some(document) = recognition.document.as_ref() else {
        log::warn!("[Pipeline] {} 全文命中但缺少分块数据，无法定位", upload.file_name);
        return Ok(Outcome::Unlocatable);
    };

    let regions = locate(document, ctx.pattern());
    if regions.is_empty() {
        log::warn!("[Pipeline] {} 全文命中但未定位到区域，保留原图", upload.file_name);
        return Ok(Outcome::Unlocatable);
    }

    let image = render_redacted(&upload.file_name, &source, &regions, ctx.cover())?;
    log::info!(
        "[Pipeline] {} → {}，遮盖 {} 处",
        upload.file_name,
        image.file_name,
        regions.len()
    );
    Ok(Outcome::Redacted { image, regions })
}

/// 单个文件的处理报告
#[derive(Debug)]
pub struct UploadReport {
    pub file_name: String,
    pub result: Result<Outcome, PipelineError>,
}

/// 依次处理一批上传
pub fn process_batch(ctx: &RedactionContext, uploads: &[Upload]) -> Vec<UploadReport> {
    uploads
        .iter()
        .map(|upload| {
            let result = process_upload(ctx, upload);
            if let Err(e) = &result {
                log::warn!("[Pipeline] {} 处理失败: {}", upload.file_name, e);
            }
            UploadReport {
                file_name: upload.file_name.clone(),
                result,
            }
        })
        .collect()
}

/// 把遮盖结果写入输出目录，目标文件已存在时报错而不覆盖
///
/// `a.jpg` 与 `a.webp` 都会输出为 `a.png`，输出目录也可能就是输入目录。
pub fn write_redacted(dir: &Path, image: &RedactedImage) -> std::io::Result<PathBuf> {
    let path = dir.join(&image.file_name);
    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    file.write_all(&image.bytes)?;
    log::debug!("[Pipeline] 写入 {}", path.display());
    Ok(path)
}
