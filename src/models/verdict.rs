use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

/// 提交给检查服务的请求体
///
/// 字段名即线上格式：`{"email", "secret", "url", "answer"}`
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub email: String,
    pub secret: String,
    /// 当前题目页面的 URL
    pub url: Url,
    pub answer: String,
}

impl std::fmt::Debug for SubmissionPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionPayload")
            .field("email", &self.email)
            .field("secret", &"***")
            .field("url", &self.url.as_str())
            .field("answer", &self.answer)
            .finish()
    }
}

/// 检查服务的原始响应
#[derive(Debug, Default, Deserialize)]
struct VerdictBody {
    #[serde(default)]
    correct: Option<bool>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// 检查服务给出的判定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionVerdict {
    pub http_status: u16,
    pub correct: bool,
    pub reason: Option<String>,
    /// 下一题的绝对 URL
    pub next_url: Option<Url>,
}

impl SubmissionVerdict {
    /// 解析响应体
    ///
    /// 缺少 `correct` 视为答错；缺少或为空的 `url` 视为没有下一题；
    /// 相对 URL 以 `base`（当前题目页面）为基准解析。
    pub fn from_body(http_status: u16, body: &str, base: &Url) -> serde_json::Result<Self> {
        let parsed: VerdictBody = serde_json::from_str(body)?;

        let next_url = parsed
            .url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match base.join(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("⚠️ 无法解析下一题 URL '{}': {}", raw, e);
                    None
                }
            });

        Ok(Self {
            http_status,
            correct: parsed.correct.unwrap_or(false),
            reason: parsed.reason,
            next_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://x/quiz/step1").unwrap()
    }

    #[test]
    fn test_payload_wire_format() {
        let payload = SubmissionPayload {
            email: "me@example.com".to_string(),
            secret: "s3cret".to_string(),
            url: base(),
            answer: "42".to_string(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "email": "me@example.com",
                "secret": "s3cret",
                "url": "http://x/quiz/step1",
                "answer": "42"
            })
        );
    }

    #[test]
    fn test_payload_debug_hides_secret() {
        let payload = SubmissionPayload {
            email: "me@example.com".to_string(),
            secret: "s3cret".to_string(),
            url: base(),
            answer: "42".to_string(),
        };
        assert!(!format!("{:?}", payload).contains("s3cret"));
    }

    fn ok_verdict(body: &str) -> SubmissionVerdict {
        SubmissionVerdict::from_body(200, body, &base()).unwrap()
    }

    #[test]
    fn test_correct_without_next_url() {
        let verdict = ok_verdict(r#"{"correct": true, "url": null}"#);
        assert!(verdict.correct);
        assert!(verdict.next_url.is_none());
        assert_eq!(verdict.http_status, 200);
    }

    #[test]
    fn test_missing_correct_is_false() {
        let verdict = ok_verdict(r#"{"reason": "bad format"}"#);
        assert!(!verdict.correct);
        assert_eq!(verdict.reason.as_deref(), Some("bad format"));
    }

    #[test]
    fn test_relative_next_url_is_resolved() {
        let verdict = ok_verdict(r#"{"correct": true, "url": "/step2"}"#);
        assert_eq!(verdict.next_url.unwrap().as_str(), "http://x/step2");
    }

    #[test]
    fn test_absolute_next_url_is_kept() {
        let verdict = ok_verdict(r#"{"correct": false, "url": "https://other.host/next"}"#);
        assert_eq!(verdict.next_url.unwrap().as_str(), "https://other.host/next");
    }

    #[test]
    fn test_blank_next_url_means_none() {
        let verdict = ok_verdict(r#"{"correct": true, "url": "  "}"#);
        assert!(verdict.next_url.is_none());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(SubmissionVerdict::from_body(200, "<html>oops</html>", &base()).is_err());
    }
}
