//! 位图遮盖
//!
//! 原图 1:1 画到同尺寸画布上，再把遮盖图拉伸后依次画到每个区域。
//! 区域重叠时后画的覆盖先画的。

use husk_core::{BBox, Region};
use image::imageops;
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::cover::CoverImage;

/// 在原图副本上遮盖所有区域
pub fn redact(source: &DynamicImage, regions: &[Region], cover: &CoverImage) -> RgbaImage {
    let mut canvas = source.to_rgba8();

    for region in regions {
        paint_region(&mut canvas, &region.bbox, cover);
    }

    log::info!(
        "[Redact] {}x{} 画布上遮盖 {} 个区域",
        canvas.width(),
        canvas.height(),
        regions.len()
    );
    canvas
}

fn paint_region(canvas: &mut RgbaImage, bbox: &BBox, cover: &CoverImage) {
    if bbox.is_empty() || bbox.x0 >= canvas.width() || bbox.y0 >= canvas.height() {
        log::debug!("[Redact] 跳过画布外或空区域: {:?}", bbox);
        return;
    }

    let visible = BBox::new(
        bbox.x0,
        bbox.y0,
        bbox.x1.min(canvas.width()),
        bbox.y1.min(canvas.height()),
    );

    match cover {
        CoverImage::Solid(color) => {
            let rect = Rect::at(visible.x0 as i32, visible.y0 as i32).of_size(visible.width(), visible.height());
            draw_filled_rect_mut(canvas, rect, *color);
        }
        CoverImage::Bitmap(_) if visible == *bbox => {
            let scaled = cover.scaled(bbox.width(), bbox.height());
            composite(canvas, &scaled, bbox.x0, bbox.y0);
        }
        CoverImage::Bitmap(img) => {
            log::debug!("[Redact] 区域超出画布，只绘制可见部分: {:?}", bbox);
            composite_clipped(canvas, img, bbox, &visible);
        }
    }
}

/// source-over 合成，超出画布的部分裁掉
fn composite(canvas: &mut RgbaImage, layer: &RgbaImage, x0: u32, y0: u32) {
    let max_x = canvas.width().saturating_sub(x0).min(layer.width());
    let max_y = canvas.height().saturating_sub(y0).min(layer.height());

    for y in 0..max_y {
        for x in 0..max_x {
            blend_pixel(canvas.get_pixel_mut(x0 + x, y0 + y), *layer.get_pixel(x, y));
        }
    }
}

/// 超出画布的区域：按整框的缩放比例把可见像素映射回遮盖图采样，
/// 不为整框分配缓冲区
fn composite_clipped(canvas: &mut RgbaImage, cover: &RgbaImage, bbox: &BBox, visible: &BBox) {
    let box_w = f64::from(bbox.width());
    let box_h = f64::from(bbox.height());

    for y in visible.y0..visible.y1 {
        let v = (f64::from(y - bbox.y0) + 0.5) / box_h;
        for x in visible.x0..visible.x1 {
            let u = (f64::from(x - bbox.x0) + 0.5) / box_w;
            if let Some(src) = imageops::sample_bilinear(cover, u as f32, v as f32) {
                blend_pixel(canvas.get_pixel_mut(x, y), src);
            }
        }
    }
}

fn blend_pixel(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    if src[3] == u8::MAX {
        *dst = src;
    } else {
        dst.blend(&src);
    }
}
