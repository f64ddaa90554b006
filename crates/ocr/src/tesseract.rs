//! Tesseract OCR 引擎实现（CLI 包装）
//!
//! 解析 TSV 输出重建 块 → 段落 → 行 → 单词 的识别树。

use husk_core::{BBox, Block, Document, Line, Paragraph, Symbol, Word};
use image::DynamicImage;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::{Recognition, TesseractConfig};

/// TSV 层级编号
const LEVEL_BLOCK: u8 = 2;
const LEVEL_PARAGRAPH: u8 = 3;
const LEVEL_LINE: u8 = 4;
const LEVEL_WORD: u8 = 5;

/// Tesseract OCR 引擎
pub struct TesseractEngine {
    config: TesseractConfig,
    version: String,
}

impl TesseractEngine {
    /// 创建 Tesseract 引擎
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        // 验证 binary 是否可用
        let version = tesseract_version(config.binary_or_default())?;
        log::info!("[Tesseract] 初始化成功，版本: {}", version);

        match tesseract_langs(config.binary_or_default(), config.tessdata_path.as_deref()) {
            Ok(langs) => {
                for lang in config.lang_or_default().split('+') {
                    if !langs.iter().any(|l| l == lang) {
                        log::warn!("[Tesseract] 未找到语言包: {}", lang);
                    }
                }
            }
            Err(e) => log::warn!("[Tesseract] 获取语言列表失败: {}", e),
        }

        Ok(Self { config, version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_image(&mut self, img: &DynamicImage) -> Result<Recognition, OcrError> {
        // 写入临时文件后交给 CLI
        let temp = tempfile::Builder::new()
            .prefix("husk_ocr_")
            .suffix(".png")
            .tempfile()?;
        img.save_with_format(temp.path(), image::ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(format!("保存临时图片失败: {}", e)))?;

        self.recognize_file(temp.path())
    }

    fn recognize_file(&mut self, image_path: &Path) -> Result<Recognition, OcrError> {
        let start = Instant::now();

        let mut cmd = Command::new(self.config.binary_or_default());
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(self.config.lang_or_default())
            .arg("--psm")
            .arg(self.config.psm_or_default().to_string())
            .arg("--oem")
            .arg(self.config.oem_or_default().to_string())
            .arg("tsv");

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }

        log::info!(
            "[Tesseract] 执行: {} {} -l {} --psm {} --oem {} tsv",
            self.config.binary_or_default(),
            image_path.display(),
            self.config.lang_or_default(),
            self.config.psm_or_default(),
            self.config.oem_or_default()
        );

        let output = cmd
            .output()
            .map_err(|e| OcrError::Execution(format!("执行 tesseract 失败: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Execution(format!("Tesseract 执行失败: {}", stderr.trim())));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let recognition = parse_tesseract_tsv(&tsv)?;

        log::info!(
            "[Tesseract] 识别完成，耗时: {} ms，块数: {}",
            start.elapsed().as_millis(),
            recognition.block_count()
        );

        Ok(recognition)
    }
}

/// 解析 Tesseract TSV 输出
///
/// TSV 格式：
/// level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
///
/// TSV 不含字符级坐标，单词内的字符框按字符数均分单词宽度。
pub fn parse_tesseract_tsv(tsv: &str) -> Result<Recognition, OcrError> {
    let mut blocks: Vec<Block> = Vec::new();

    // 跳过表头
    for (row, line) in tsv.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 11 {
            return Err(OcrError::Malformed(format!("第 {} 行列数不足: {}", row + 1, cols.len())));
        }

        let level: u8 = parse_col(&cols, 0, row)?;
        if level < LEVEL_BLOCK {
            continue;
        }
        let left: u32 = parse_col(&cols, 6, row)?;
        let top: u32 = parse_col(&cols, 7, row)?;
        let width: u32 = parse_col(&cols, 8, row)?;
        let height: u32 = parse_col(&cols, 9, row)?;
        let bbox = match (left.checked_add(width), top.checked_add(height)) {
            (Some(right), Some(bottom)) => BBox::new(left, top, right, bottom),
            _ => {
                return Err(OcrError::Malformed(format!(
                    "第 {} 行坐标越界: left={} top={} width={} height={}",
                    row + 1,
                    left,
                    top,
                    width,
                    height
                )))
            }
        };

        let orphan = |what: &str| OcrError::Malformed(format!("第 {} 行: {} 缺少上级节点", row + 1, what));

        match level {
            LEVEL_BLOCK => blocks.push(Block {
                text: String::new(),
                bbox,
                paragraphs: Vec::new(),
            }),
            LEVEL_PARAGRAPH => blocks
                .last_mut()
                .ok_or_else(|| orphan("paragraph"))?
                .paragraphs
                .push(Paragraph {
                    text: String::new(),
                    bbox,
                    lines: Vec::new(),
                }),
            LEVEL_LINE => blocks
                .last_mut()
                .and_then(|b| b.paragraphs.last_mut())
                .ok_or_else(|| orphan("line"))?
                .lines
                .push(Line {
                    text: String::new(),
                    bbox,
                    words: Vec::new(),
                }),
            LEVEL_WORD => {
                let conf: f32 = cols[10].trim().parse().unwrap_or(-1.0);
                let text = cols.get(11).map(|t| t.trim()).unwrap_or("");
                // 跳过空文本和无效置信度
                if text.is_empty() || conf < 0.0 {
                    continue;
                }
                blocks
                    .last_mut()
                    .and_then(|b| b.paragraphs.last_mut())
                    .and_then(|p| p.lines.last_mut())
                    .ok_or_else(|| orphan("word"))?
                    .words
                    .push(Word {
                        text: text.to_string(),
                        bbox,
                        symbols: split_symbols(text, bbox),
                    });
            }
            _ => {}
        }
    }

    let blocks: Vec<Block> = blocks.into_iter().filter_map(finish_block).collect();
    let text = blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(Recognition {
        text,
        document: Some(Document::new(blocks)),
    })
}

fn parse_col<T: std::str::FromStr>(cols: &[&str], idx: usize, row: usize) -> Result<T, OcrError> {
    cols[idx]
        .trim()
        .parse()
        .map_err(|_| OcrError::Malformed(format!("第 {} 行第 {} 列无法解析: {:?}", row + 1, idx + 1, cols[idx])))
}

/// 自底向上拼接文字，丢弃没有单词的节点
fn finish_block(mut block: Block) -> Option<Block> {
    block.paragraphs = block
        .paragraphs
        .into_iter()
        .filter_map(|mut para| {
            para.lines = para
                .lines
                .into_iter()
                .filter(|line| !line.words.is_empty())
                .map(|mut line| {
                    line.text = join_texts(line.words.iter().map(|w| w.text.as_str()), " ");
                    line
                })
                .collect();
            if para.lines.is_empty() {
                return None;
            }
            para.text = join_texts(para.lines.iter().map(|l| l.text.as_str()), "\n");
            Some(para)
        })
        .collect();

    if block.paragraphs.is_empty() {
        return None;
    }
    block.text = join_texts(block.paragraphs.iter().map(|p| p.text.as_str()), "\n\n");
    Some(block)
}

fn join_texts<'a>(parts: impl Iterator<Item = &'a str>, sep: &str) -> String {
    parts.collect::<Vec<_>>().join(sep)
}

/// 按字符数均分单词框
fn split_symbols(text: &str, bbox: BBox) -> Vec<Symbol> {
    let count = text.chars().count() as u64;
    if count == 0 {
        return Vec::new();
    }
    let width = u64::from(bbox.width());
    // 偏移不超过单词宽度，x0 + 偏移 不会超过 x1
    let offset = |i: u64| (width * i / count) as u32;
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let i = i as u64;
            Symbol {
                text: c.to_string(),
                bbox: BBox::new(bbox.x0 + offset(i), bbox.y0, bbox.x0 + offset(i + 1), bbox.y1),
            }
        })
        .collect()
}

/// 获取 Tesseract 版本
pub fn tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| OcrError::Unavailable(format!("无法执行 {}: {}", binary_path, e)))?;

    if !output.status.success() {
        return Err(OcrError::Unavailable(format!("{} --version 执行失败", binary_path)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{}{}", stdout, stderr);

    Ok(parse_version(&combined).unwrap_or_else(|| "unknown".to_string()))
}

/// 版本号通常在第一行，格式为 "tesseract 5.3.0" 或 "tesseract v5.3.0"
fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains("tesseract"))
        .find_map(|line| line.split_whitespace().nth(1))
        .map(|v| v.trim_start_matches('v').to_string())
}

/// 获取 Tesseract 可用语言列表
pub fn tesseract_langs(binary_path: &str, tessdata_path: Option<&str>) -> Result<Vec<String>, OcrError> {
    let mut cmd = Command::new(binary_path);
    cmd.arg("--list-langs");

    if let Some(path) = tessdata_path {
        cmd.env("TESSDATA_PREFIX", path);
    }

    let output = cmd
        .output()
        .map_err(|e| OcrError::Execution(format!("执行失败: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    Ok(parse_langs(&format!("{}{}", stdout, stderr)))
}

fn parse_langs(output: &str) -> Vec<String> {
    let mut langs = Vec::new();
    let mut found_list = false;

    for line in output.lines() {
        let line = line.trim();
        if line.contains("List of available languages") {
            found_list = true;
            continue;
        }
        if found_list && !line.is_empty() && !line.contains(':') {
            langs.push(line.to_string());
        }
    }

    langs
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    #[test]
    fn test_parse_tsv_tree() {
        let input = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t400\t300\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t10\t200\t40\t-1\t",
            "3\t1\t1\t1\t0\t0\t10\t10\t200\t40\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t200\t12\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t30\t12\t95.5\tfoo",
            "5\t1\t1\t1\t1\t2\t50\t10\t50\t12\t91.0\tnixos",
            "4\t1\t1\t1\t2\t0\t10\t30\t60\t12\t-1\t",
            "5\t1\t1\t1\t2\t1\t10\t30\t60\t12\t90.1\tguide",
        ]);
        let rec = parse_tesseract_tsv(&input).unwrap();
        let doc = rec.document.unwrap();

        assert_eq!(doc.blocks.len(), 1);
        let block = &doc.blocks[0];
        assert_eq!(block.bbox, BBox::new(10, 10, 210, 50));
        assert_eq!(block.text, "foo nixos\nguide");
        assert_eq!(rec.text, "foo nixos\nguide");

        let line = &block.paragraphs[0].lines[0];
        assert_eq!(line.text, "foo nixos");
        assert_eq!(line.words[1].bbox, BBox::new(50, 10, 100, 22));
        assert_eq!(line.words[1].symbols.len(), 5);
        assert_eq!(line.words[1].symbols[0].bbox, BBox::new(50, 10, 60, 22));
        assert_eq!(line.words[1].symbols[4].bbox, BBox::new(90, 10, 100, 22));
    }

    #[test]
    fn test_parse_tsv_skips_empty_words() {
        let input = tsv(&[
            "2\t1\t1\t0\t0\t0\t0\t0\t100\t20\t-1\t",
            "3\t1\t1\t1\t0\t0\t0\t0\t100\t20\t-1\t",
            "4\t1\t1\t1\t1\t0\t0\t0\t100\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t100\t20\t95\t ",
            "2\t1\t2\t0\t0\t0\t0\t40\t100\t20\t-1\t",
            "3\t1\t2\t1\t0\t0\t0\t40\t100\t20\t-1\t",
            "4\t1\t2\t1\t1\t0\t0\t40\t100\t20\t-1\t",
            "5\t1\t2\t1\t1\t1\t0\t40\t40\t20\t88\tok",
        ]);
        let rec = parse_tesseract_tsv(&input).unwrap();
        assert_eq!(rec.block_count(), 1);
        assert_eq!(rec.text, "ok");
    }

    #[test]
    fn test_parse_tsv_paragraph_text() {
        let input = tsv(&[
            "2\t1\t1\t0\t0\t0\t0\t0\t100\t60\t-1\t",
            "3\t1\t1\t1\t0\t0\t0\t0\t100\t20\t-1\t",
            "4\t1\t1\t1\t1\t0\t0\t0\t100\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t40\t20\t90\tcontent",
            "3\t1\t1\t2\t0\t0\t0\t40\t100\t20\t-1\t",
            "4\t1\t1\t2\t1\t0\t0\t40\t100\t20\t-1\t",
            "5\t1\t1\t2\t1\t1\t0\t40\t40\t20\t90\tblocked",
        ]);
        let rec = parse_tesseract_tsv(&input).unwrap();
        let doc = rec.document.unwrap();
        assert_eq!(doc.blocks[0].paragraphs.len(), 2);
        assert_eq!(doc.blocks[0].text, "content\n\nblocked");
    }

    #[test]
    fn test_parse_tsv_orphan_word() {
        let input = tsv(&["5\t1\t1\t1\t1\t1\t0\t0\t40\t20\t90\tlost"]);
        assert!(matches!(parse_tesseract_tsv(&input), Err(OcrError::Malformed(_))));
    }

    #[test]
    fn test_parse_tsv_bad_number() {
        let input = tsv(&["2\t1\t1\t0\t0\t0\tx\t0\t100\t20\t-1\t"]);
        assert!(matches!(parse_tesseract_tsv(&input), Err(OcrError::Malformed(_))));
    }

    #[test]
    fn test_parse_tsv_coordinate_overflow() {
        let input = tsv(&["2\t1\t1\t0\t0\t0\t4294967295\t0\t10\t20\t-1\t"]);
        assert!(matches!(parse_tesseract_tsv(&input), Err(OcrError::Malformed(_))));

        let input = tsv(&["2\t1\t1\t0\t0\t0\t0\t4294967290\t10\t20\t-1\t"]);
        assert!(matches!(parse_tesseract_tsv(&input), Err(OcrError::Malformed(_))));
    }

    #[test]
    fn test_split_symbols_wide_word() {
        let symbols = split_symbols("ab", BBox::new(0, 0, u32::MAX, 5));
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].bbox.x1, u32::MAX / 2);
        assert_eq!(symbols[1].bbox.x1, u32::MAX);
    }

    #[test]
    fn test_parse_tsv_empty_output() {
        let rec = parse_tesseract_tsv(HEADER).unwrap();
        assert_eq!(rec.block_count(), 0);
        assert!(rec.text.is_empty());
    }

    #[test]
    fn test_split_symbols_uneven() {
        let symbols = split_symbols("abc", BBox::new(0, 0, 10, 5));
        let xs: Vec<(u32, u32)> = symbols.iter().map(|s| (s.bbox.x0, s.bbox.x1)).collect();
        assert_eq!(xs, vec![(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("tesseract 5.3.0\n leptonica-1.82.0"), Some("5.3.0".to_string()));
        assert_eq!(parse_version("tesseract v4.1.1"), Some("4.1.1".to_string()));
        assert_eq!(parse_version("nothing here"), None);
    }

    #[test]
    fn test_parse_langs() {
        let output = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\nchi_sim\n";
        assert_eq!(parse_langs(output), vec!["eng", "osd", "chi_sim"]);
    }
}
