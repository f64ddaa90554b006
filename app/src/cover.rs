//! 遮盖图加载
//!
//! 启动时获取一次，之后所有遮盖都复用同一张图。

use husk_render::{CoverImage, RenderError};
use image::Rgba;
use std::time::Duration;

use crate::config::CoverSource;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum CoverError {
    #[error("failed to read cover image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch cover image: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] RenderError),
}

pub fn load_cover(source: &CoverSource) -> Result<CoverImage, CoverError> {
    match source {
        CoverSource::Path(path) => {
            log::info!("[Cover] 读取本地遮盖图: {}", path.display());
            let bytes = std::fs::read(path)?;
            Ok(CoverImage::decode(&bytes)?)
        }
        CoverSource::Url(url) => {
            log::info!("[Cover] 下载遮盖图: {}", url);
            let client = reqwest::blocking::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()?;
            let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
            Ok(CoverImage::decode(&bytes)?)
        }
        CoverSource::Color(rgba) => Ok(CoverImage::Solid(Rgba(*rgba))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    #[test]
    fn test_load_color() {
        let cover = load_cover(&CoverSource::Color([9, 8, 7, 255])).unwrap();
        assert!(matches!(cover, CoverImage::Solid(Rgba([9, 8, 7, 255]))));
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        match load_cover(&CoverSource::Path(path)).unwrap() {
            CoverImage::Bitmap(img) => assert_eq!(img.dimensions(), (3, 2)),
            CoverImage::Solid(_) => panic!("expected bitmap cover"),
        }
    }

    #[test]
    fn test_load_missing_path() {
        let err = load_cover(&CoverSource::Path("/nonexistent/cover.png".into())).unwrap_err();
        assert!(matches!(err, CoverError::Io(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"garbage").unwrap();
        let err = load_cover(&CoverSource::Path(path)).unwrap_err();
        assert!(matches!(err, CoverError::Decode(_)));
    }
}
