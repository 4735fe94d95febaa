/// 答案为空时提交的占位值
pub const ANSWER_PLACEHOLDER: &str = "No answer provided";

/// 答案的提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// 找到了 `ANSWER:` 标记
    Marker,
    /// 没有标记，取最后一个非空行
    LastLine,
}

/// 从推理输出中提取出的候选答案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCandidate {
    pub raw_backend_output: String,
    pub extracted_value: String,
    pub extraction_method: ExtractionMethod,
}

impl AnswerCandidate {
    /// 实际提交的值，永远不为空
    pub fn submission_value(&self) -> &str {
        if self.extracted_value.trim().is_empty() {
            ANSWER_PLACEHOLDER
        } else {
            &self.extracted_value
        }
    }
}
