//! 区域定位
//!
//! 自顶向下遍历识别树，为每处命中找出尽量小的遮盖框。
//! 某一层整体命中但子节点都没有单独命中时，退回使用该层自身的框。

use crate::document::{BBox, Children, Document, Level, Node, Symbol};
use crate::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// 遮盖框来源层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSource {
    /// 单词内一段连续字符的并集
    Symbols,
    Word,
    Line,
    Paragraph,
    Block,
}

impl From<Level> for RegionSource {
    fn from(level: Level) -> Self {
        match level {
            Level::Block => RegionSource::Block,
            Level::Paragraph => RegionSource::Paragraph,
            Level::Line => RegionSource::Line,
            Level::Word => RegionSource::Word,
        }
    }
}

/// 需要遮盖的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub bbox: BBox,
    pub source: RegionSource,
}

/// 定位文档中所有需要遮盖的区域，顺序与阅读顺序一致
pub fn locate(document: &Document, pattern: &Pattern) -> Vec<Region> {
    let regions: Vec<Region> = document
        .nodes()
        .flat_map(|block| locate_node(block, pattern))
        .collect();

    log::info!(
        "[Locate] {} 个块中定位到 {} 个遮盖区域",
        document.blocks.len(),
        regions.len()
    );
    regions
}

fn locate_node(node: Node<'_>, pattern: &Pattern) -> Vec<Region> {
    if !pattern.is_match(node.text()) {
        return Vec::new();
    }

    let mut regions: Vec<Region> = match node.children() {
        Children::Nodes(children) => children
            .into_iter()
            .flat_map(|child| locate_node(child, pattern))
            .collect(),
        Children::Symbols(symbols) => locate_in_word(node.text(), symbols, pattern),
    };

    if regions.is_empty() {
        log::debug!(
            "[Locate] {} \"{}\" 命中但子级未命中，使用整体边界框",
            node.level(),
            node.text()
        );
        regions.push(Region {
            bbox: node.bbox(),
            source: node.level().into(),
        });
    }

    regions
}

/// 单词内逐个匹配，每处匹配取对应字符片段的并集
fn locate_in_word(text: &str, symbols: &[Symbol], pattern: &Pattern) -> Vec<Region> {
    pattern
        .find_char_spans(text)
        .into_iter()
        .filter_map(|span| {
            let start = span.start.min(symbols.len());
            let end = span.end.min(symbols.len());
            let bbox = BBox::union_all(symbols[start..end].iter().map(|s| &s.bbox))?;
            Some(Region {
                bbox,
                source: RegionSource::Symbols,
            })
        })
        .collect()
}
