/// 超出预算时追加的截断标记
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// 按字符数截断并追加截断标记
///
/// 返回 (文本, 是否被截断)。
pub fn truncate_with_marker(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (format!("{}{}", &text[..byte_index], TRUNCATION_MARKER), true),
        None => (text.to_string(), false),
    }
}
