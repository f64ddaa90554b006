//! 识别树数据结构
//!
//! OCR 结果按层级组织：文档 → 块 → 段落 → 行 → 单词 → 字符。
//! 每个节点都带有整棵子树的文字和像素坐标下的边界框。

use serde::{Deserialize, Serialize};

/// 边界框（源图像素坐标）
///
/// 约定 `x0 <= x1`、`y0 <= y1`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BBox {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// 两个框的并集（逐分量取最小/最大）
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// 一组框的并集，空序列返回 `None`
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes.into_iter().fold(None, |acc, b| match acc {
            Some(a) => Some(BBox::union(&a, b)),
            None => Some(*b),
        })
    }

    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }
}

/// 字符（叶子单元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub text: String,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub text: String,
    pub bbox: BBox,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

/// 识别树根节点
///
/// 序列化时直接表示为块数组。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 按阅读顺序访问顶层节点
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        self.blocks.iter().map(Node::Block)
    }
}

/// 节点层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Block,
    Paragraph,
    Line,
    Word,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Block => write!(f, "block"),
            Level::Paragraph => write!(f, "paragraph"),
            Level::Line => write!(f, "line"),
            Level::Word => write!(f, "word"),
        }
    }
}

/// 四个层级的统一借用视图
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Block(&'a Block),
    Paragraph(&'a Paragraph),
    Line(&'a Line),
    Word(&'a Word),
}

/// 节点的下一层内容：子节点或（单词层的）字符
#[derive(Debug)]
pub enum Children<'a> {
    Nodes(Vec<Node<'a>>),
    Symbols(&'a [Symbol]),
}

impl<'a> Node<'a> {
    pub fn level(&self) -> Level {
        match self {
            Node::Block(_) => Level::Block,
            Node::Paragraph(_) => Level::Paragraph,
            Node::Line(_) => Level::Line,
            Node::Word(_) => Level::Word,
        }
    }

    pub fn text(&self) -> &'a str {
        match *self {
            Node::Block(b) => &b.text,
            Node::Paragraph(p) => &p.text,
            Node::Line(l) => &l.text,
            Node::Word(w) => &w.text,
        }
    }

    pub fn bbox(&self) -> BBox {
        match *self {
            Node::Block(b) => b.bbox,
            Node::Paragraph(p) => p.bbox,
            Node::Line(l) => l.bbox,
            Node::Word(w) => w.bbox,
        }
    }

    pub fn children(&self) -> Children<'a> {
        match *self {
            Node::Block(b) => Children::Nodes(b.paragraphs.iter().map(Node::Paragraph).collect()),
            Node::Paragraph(p) => Children::Nodes(p.lines.iter().map(Node::Line).collect()),
            Node::Line(l) => Children::Nodes(l.words.iter().map(Node::Word).collect()),
            Node::Word(w) => Children::Symbols(&w.symbols),
        }
    }
}
