//! 提示词构建
//!
//! 纯函数：把题目、采集到的数据和链接表拼成发给 LLM 的提示词。

use std::fmt::Write;

use crate::models::{CollectedData, DatumContent, QuizPage};
use crate::services::answer_extractor::ANSWER_MARKER;
use crate::utils::{truncate_with_marker, TRUNCATION_MARKER};

/// 题目拆解提示词
pub fn build_interpret_prompt(question_text: &str) -> String {
    format!(
        r#"Read this quiz question carefully and break it down.

QUESTION:
{question_text}

Please identify:
1. What task needs to be done (web scraping, API call, PDF analysis, calculation, chart generation, etc.)
2. What data sources are mentioned or needed
3. What format the answer should be in (number, string, boolean, JSON, etc.)
4. What steps are required

Be clear and concise."#
    )
}

/// 解题提示词
///
/// 每个数据项最多保留 `per_item_cap` 个字符，超出部分以截断标记结尾。
pub fn build_solve_prompt(
    page: &QuizPage,
    data: &CollectedData,
    interpretation: Option<&str>,
    per_item_cap: usize,
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Solve this quiz question step by step.\n");
    let _ = writeln!(prompt, "QUIZ PAGE URL: {}\n", page.url);
    let _ = writeln!(prompt, "QUIZ QUESTION:\n{}\n", page.question_text);

    if let Some(interpretation) = interpretation.filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(prompt, "TASK BREAKDOWN:\n{}\n", interpretation.trim());
    }

    let _ = writeln!(prompt, "AVAILABLE DATA:\n{}", format_data(data, per_item_cap));
    let _ = writeln!(prompt, "LINKS ON PAGE:\n{}", format_links(page));

    let _ = write!(
        prompt,
        r#"Instructions:
1. Carefully read and understand what's being asked
2. Use the provided data to find the answer
3. Show your reasoning step by step
4. Be precise with calculations
5. Finish with exactly one line of the form:
{ANSWER_MARKER} <the answer only, no explanation>"#
    );

    prompt
}

fn format_data(data: &CollectedData, per_item_cap: usize) -> String {
    if data.is_empty() {
        return "No data provided\n".to_string();
    }

    let mut out = String::new();
    for datum in data.iter() {
        let _ = writeln!(
            out,
            "--- {} ({}, {}) ---",
            datum.source_link_text, datum.kind, datum.source_url
        );
        match &datum.content {
            DatumContent::Text(text) => {
                let _ = writeln!(out, "{}", cap_text(text, datum.truncated, per_item_cap));
            }
            DatumContent::Bytes(bytes) => {
                let _ = writeln!(out, "[binary {} content, {} bytes]", datum.kind, bytes.len());
            }
        }
    }
    out
}

/// 按提示词上限截断；已被采集阶段截断的文本只保留一个截断标记
fn cap_text(text: &str, already_truncated: bool, cap: usize) -> String {
    let body = if already_truncated {
        text.strip_suffix(TRUNCATION_MARKER).unwrap_or(text)
    } else {
        text
    };
    let (mut capped, cut) = truncate_with_marker(body, cap);
    if already_truncated && !cut {
        capped.push_str(TRUNCATION_MARKER);
    }
    capped
}

fn format_links(page: &QuizPage) -> String {
    if page.links.is_empty() {
        return "(none)\n".to_string();
    }

    let mut out = String::new();
    for (text, url) in page.links.iter() {
        let _ = writeln!(out, "- {}: {}", text, url);
    }
    out
}
