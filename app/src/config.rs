use husk_ocr::{OcrEngineType, TesseractConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 默认的敏感内容匹配模式
pub const DEFAULT_PATTERN: &str = "nix(?:os)?|This ?content ?is|blocked ?by ?this ?server";

pub const DEFAULT_OUTPUT_DIR: &str = "redacted";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// 匹配模式（裸正则或 `/body/flags`）
    pub pattern: String,
    /// 遮盖图来源
    pub cover: CoverSource,

    // ============ OCR 引擎选择 ============
    /// 当前使用的 OCR 引擎
    pub ocr_engine: OcrEngineType,
    /// Tesseract 配置
    pub tesseract: TesseractConfig,

    /// 输出目录
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            cover: CoverSource::default(),
            ocr_engine: OcrEngineType::default(),
            tesseract: TesseractConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// 遮盖图来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverSource {
    /// 本地图片文件
    Path(PathBuf),
    /// 远程图片地址
    Url(String),
    /// 纯色 RGBA
    Color([u8; 4]),
}

impl Default for CoverSource {
    fn default() -> Self {
        CoverSource::Color([0, 0, 0, 255])
    }
}

impl FromStr for CoverSource {
    type Err = ConfigError;

    /// `http(s)://` 视为地址，`#rrggbb` / `#rrggbbaa` 视为颜色，其余视为文件路径
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(CoverSource::Url(s.to_string()));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex_color(hex).map(CoverSource::Color);
        }
        Ok(CoverSource::Path(PathBuf::from(s)))
    }
}

fn parse_hex_color(hex: &str) -> Result<[u8; 4], ConfigError> {
    let invalid = || ConfigError::InvalidColor(format!("#{}", hex));
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let mut rgba = [0u8, 0, 0, 255];
    for (i, slot) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
        *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgba)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid colour: {0}")]
    InvalidColor(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 读取配置文件，文件不存在时返回默认配置
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        log::info!("[Config] {} 不存在，使用默认配置", path.display());
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    let config = serde_json::from_str(&raw)?;
    log::info!("[Config] 已加载 {}", path.display());
    Ok(config)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    log::info!("[Config] 已保存 {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.cover, CoverSource::Color([0, 0, 0, 255]));
        assert_eq!(config.ocr_engine, OcrEngineType::Tesseract);
        assert_eq!(config.output_dir, PathBuf::from("redacted"));
    }

    #[test]
    fn test_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "pattern": "/secret/i",
                "cover": {"url": "https://example.com/cover.webp"},
                "ocrEngine": "sidecar",
                "tesseract": {"lang": "eng+deu", "psm": 6}
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.pattern, "/secret/i");
        assert_eq!(config.cover, CoverSource::Url("https://example.com/cover.webp".to_string()));
        assert_eq!(config.ocr_engine, OcrEngineType::Sidecar);
        assert_eq!(config.tesseract.lang_or_default(), "eng+deu");
        assert_eq!(config.tesseract.psm_or_default(), 6);
        assert_eq!(config.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig {
            cover: CoverSource::Path(PathBuf::from("cover.png")),
            ..Default::default()
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.cover, CoverSource::Path(PathBuf::from("cover.png")));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_cover_source_from_str() {
        assert_eq!(
            "https://cdn.example.com/husk.webp".parse::<CoverSource>().unwrap(),
            CoverSource::Url("https://cdn.example.com/husk.webp".to_string())
        );
        assert_eq!("#ff8000".parse::<CoverSource>().unwrap(), CoverSource::Color([255, 128, 0, 255]));
        assert_eq!("#00000080".parse::<CoverSource>().unwrap(), CoverSource::Color([0, 0, 0, 128]));
        assert_eq!(
            "covers/husk.png".parse::<CoverSource>().unwrap(),
            CoverSource::Path(PathBuf::from("covers/husk.png"))
        );
        assert!(matches!("#12".parse::<CoverSource>(), Err(ConfigError::InvalidColor(_))));
        assert!(matches!("#gggggg".parse::<CoverSource>(), Err(ConfigError::InvalidColor(_))));
    }
}
