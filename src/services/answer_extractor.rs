//! 答案提取 - 纯文本处理
//!
//! 从 LLM 的原始输出中取出一个答案值，确定性、无副作用。

use crate::models::{AnswerCandidate, ExtractionMethod};

/// 答案标记（大小写不敏感）
pub const ANSWER_MARKER: &str = "ANSWER:";

/// 提取答案值
///
/// 没有任何非空行时返回空字符串，由调用方替换为占位值。
pub fn extract(raw: &str) -> String {
    extract_candidate(raw).extracted_value
}

/// 提取答案并记录提取方式
///
/// 1. 取最后一个 `ANSWER:` 标记，答案为标记之后到行尾的内容；
///    标记后为空时取下一个非空行
/// 2. 没有标记时取最后一个非空行
pub fn extract_candidate(raw: &str) -> AnswerCandidate {
    let lines: Vec<&str> = raw.lines().collect();

    let marker_hit = lines.iter().enumerate().rev().find_map(|(index, line)| {
        // ASCII 大写不改变字节长度，下标可直接用于原行
        line.to_ascii_uppercase()
            .rfind(ANSWER_MARKER)
            .map(|pos| (index, &line[pos + ANSWER_MARKER.len()..]))
    });

    let (extracted_value, extraction_method) = match marker_hit {
        Some((index, rest)) => {
            let inline = clean(rest);
            let value = if inline.is_empty() {
                lines[index + 1..]
                    .iter()
                    .map(|line| clean(line))
                    .find(|line| !line.is_empty())
                    .unwrap_or_default()
            } else {
                inline
            };
            (value.to_string(), ExtractionMethod::Marker)
        }
        None => {
            let value = lines
                .iter()
                .rev()
                .map(|line| line.trim())
                .find(|line| !line.is_empty())
                .unwrap_or_default();
            (value.to_string(), ExtractionMethod::LastLine)
        }
    };

    AnswerCandidate {
        raw_backend_output: raw.to_string(),
        extracted_value,
        extraction_method,
    }
}

/// 去掉空白和 Markdown 强调符号
fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '`')
}
