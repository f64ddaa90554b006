//! 匹配模式
//!
//! 对外只暴露一个不区分大小写的正则。配置里既可以写裸正则，
//! 也可以写 `/body/flags` 字面量形式。

use crate::{CoreError, Result};
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// 字面量形式允许的标志位
const KNOWN_FLAGS: &str = "gimsuy";

/// 编译后的匹配模式
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    source: String,
}

impl Pattern {
    /// 从裸正则构建，始终不区分大小写
    pub fn new(pattern: &str) -> Result<Self> {
        Self::build(pattern, false, false)
    }

    /// 解析配置中的模式，支持 `/nix(?:os)?/i` 这样的字面量
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((body, flags)) = split_literal(raw) else {
            return Self::new(raw);
        };

        let mut multi_line = false;
        let mut dot_all = false;
        for flag in flags.chars() {
            match flag {
                'm' => multi_line = true,
                's' => dot_all = true,
                c if KNOWN_FLAGS.contains(c) => {}
                c => return Err(CoreError::InvalidFlag(c)),
            }
        }

        Self::build(body, multi_line, dot_all)
    }

    fn build(body: &str, multi_line: bool, dot_all: bool) -> Result<Self> {
        let regex = RegexBuilder::new(body)
            .case_insensitive(true)
            .multi_line(multi_line)
            .dot_matches_new_line(dot_all)
            .build()
            .map_err(|source| CoreError::InvalidPattern {
                pattern: body.to_string(),
                source,
            })?;

        log::info!("[Pattern] 已编译匹配模式: {}", body);
        Ok(Self {
            regex,
            source: body.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// 整段文字是否包含匹配
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// 查找全部不重叠的匹配，返回字符下标区间
    ///
    /// 字符下标与单词内字符序列按位置一一对应。
    pub fn find_char_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut byte_cursor = 0;
        let mut char_cursor = 0;

        for m in self.regex.find_iter(text) {
            char_cursor += text[byte_cursor..m.start()].chars().count();
            let len = m.as_str().chars().count();
            spans.push(char_cursor..char_cursor + len);
            char_cursor += len;
            byte_cursor = m.end();
        }

        spans
    }
}

/// 拆分 `/body/flags`，不是字面量形式时返回 `None`
fn split_literal(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let (body, flags) = (&rest[..end], &rest[end + 1..]);
    if flags.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((body, flags))
    } else {
        None
    }
}
