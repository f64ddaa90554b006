//! 脱敏上下文
//!
//! 启动时构建一次：编译好的匹配模式、遮盖图、唯一的 OCR 引擎实例。
//! 引擎用互斥锁串行化访问，关闭时显式调用 [`RedactionContext::shutdown`]。

use husk_core::{CoreError, Pattern};
use husk_ocr::{create_engine, OcrEngine, OcrError, Recognition};
use husk_render::CoverImage;
use image::DynamicImage;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use crate::config::AppConfig;
use crate::cover::{load_cover, CoverError};

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Pattern(#[from] CoreError),
    #[error(transparent)]
    Cover(#[from] CoverError),
    #[error("failed to initialise OCR engine: {0}")]
    Engine(#[from] OcrError),
}

pub struct RedactionContext {
    pattern: Pattern,
    cover: CoverImage,
    engine: Mutex<Box<dyn OcrEngine>>,
}

impl RedactionContext {
    pub fn new(pattern: Pattern, cover: CoverImage, engine: Box<dyn OcrEngine>) -> Self {
        Self {
            pattern,
            cover,
            engine: Mutex::new(engine),
        }
    }

    /// 按配置构建：先校验模式，再加载遮盖图，最后初始化引擎
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let pattern = Pattern::parse(&config.pattern)?;
        let cover = load_cover(&config.cover)?;
        let engine = create_engine(config.ocr_engine, &config.tesseract)?;
        Ok(Self::new(pattern, cover, engine))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn cover(&self) -> &CoverImage {
        &self.cover
    }

    /// 识别一张图片，有原始文件时直接交给引擎读取文件
    pub fn recognize(&self, path: Option<&Path>, image: &DynamicImage) -> Result<Recognition, OcrError> {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();
        let recognition = match path {
            Some(path) => engine.recognize_file(path)?,
            None => engine.recognize_image(image)?,
        };
        log::debug!(
            "[Context] {} 识别耗时 {} ms",
            engine.name(),
            start.elapsed().as_millis()
        );
        Ok(recognition)
    }

    /// 关闭 OCR 引擎
    pub fn shutdown(self) {
        let mut engine = self.engine.into_inner().unwrap_or_else(PoisonError::into_inner);
        log::info!("[Context] 关闭 OCR 引擎: {}", engine.name());
        engine.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoverSource;
    use husk_ocr::OcrEngineType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingEngine {
        calls: Arc<AtomicUsize>,
        terminated: Arc<AtomicUsize>,
    }

    impl OcrEngine for CountingEngine {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn recognize_image(&mut self, _img: &DynamicImage) -> Result<Recognition, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Recognition::default())
        }

        fn terminate(&mut self) {
            self.terminated.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_shutdown_terminates_engine() {
        let calls = Arc::new(AtomicUsize::new(0));
        let terminated = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine {
            calls: calls.clone(),
            terminated: terminated.clone(),
        };
        let ctx = RedactionContext::new(Pattern::new("nix").unwrap(), CoverImage::default(), Box::new(engine));

        ctx.recognize(None, &DynamicImage::new_rgba8(2, 2)).unwrap();
        ctx.recognize(None, &DynamicImage::new_rgba8(2, 2)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        ctx.shutdown();
        assert_eq!(terminated.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_rejects_bad_pattern() {
        let config = AppConfig {
            pattern: "nix(".to_string(),
            ocr_engine: OcrEngineType::Sidecar,
            ..Default::default()
        };
        let err = RedactionContext::from_config(&config).err().unwrap();
        assert!(matches!(err, ContextError::Pattern(_)));
    }

    #[test]
    fn test_from_config_sidecar() {
        let config = AppConfig {
            pattern: "/secret/i".to_string(),
            cover: CoverSource::Color([255, 0, 0, 255]),
            ocr_engine: OcrEngineType::Sidecar,
            ..Default::default()
        };
        let ctx = RedactionContext::from_config(&config).unwrap();
        assert!(ctx.pattern().is_match("SECRET"));
        assert!(matches!(ctx.cover(), CoverImage::Solid(_)));
        ctx.shutdown();
    }
}
