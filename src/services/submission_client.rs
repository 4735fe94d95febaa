//! 答案提交服务 - 业务能力层
//!
//! 只负责"POST 答案并解析判定"，不决定下一步做什么。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::SubmissionError;
use crate::models::{SubmissionPayload, SubmissionVerdict};
use crate::utils::truncate_text;

/// 提交能力
#[async_trait]
pub trait Submitter: Send + Sync {
    /// 提交答案；相对的下一题 URL 以 `payload.url` 为基准解析
    async fn submit(
        &self,
        submit_url: &Url,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionVerdict, SubmissionError>;
}

/// 基于 HTTP 的提交客户端
///
/// 每次调用有独立超时，与链路截止时间无关。
pub struct SubmissionClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl SubmissionClient {
    pub fn new(config: &Config) -> Self {
        Self::with_timeout(config.submit_timeout())
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Submitter for SubmissionClient {
    async fn submit(
        &self,
        submit_url: &Url,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionVerdict, SubmissionError> {
        let endpoint = submit_url.to_string();
        debug!("📨 提交答案到 {}: {:?}", endpoint, payload);

        let response = self
            .client
            .post(submit_url.clone())
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SubmissionError::Request {
                endpoint: endpoint.clone(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SubmissionError::Request {
            endpoint: endpoint.clone(),
            source: Box::new(e),
        })?;

        if !status.is_success() {
            warn!("⚠️ 提交接口返回 {}: {}", status, truncate_text(&body, 200));
            return Err(SubmissionError::Status {
                endpoint,
                status: status.as_u16(),
                body: truncate_text(&body, 500),
            });
        }

        SubmissionVerdict::from_body(status.as_u16(), &body, &payload.url).map_err(|e| {
            SubmissionError::Parse {
                endpoint,
                source: Box::new(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// 只应答一次的本地 HTTP 服务，返回收到的请求体
    async fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            let text = String::from_utf8_lossy(&received).to_string();
            text.split_once("\r\n\r\n")
                .map(|(_, b)| b.to_string())
                .unwrap_or_default()
        });

        (Url::parse(&format!("http://{}/submit", addr)).unwrap(), handle)
    }

    fn payload() -> SubmissionPayload {
        SubmissionPayload {
            email: "me@example.com".to_string(),
            secret: "s3cret".to_string(),
            url: Url::parse("http://quiz.example.com/demo/step1").unwrap(),
            answer: "42".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_posts_payload_and_parses_verdict() {
        let (submit_url, server) = one_shot_server(
            "200 OK",
            r#"{"correct": true, "reason": null, "url": "/demo/step2"}"#,
        )
        .await;

        let verdict = SubmissionClient::with_timeout(Duration::from_secs(5))
            .submit(&submit_url, &payload())
            .await
            .unwrap();

        assert!(verdict.correct);
        assert_eq!(verdict.http_status, 200);
        assert_eq!(
            verdict.next_url.unwrap().as_str(),
            "http://quiz.example.com/demo/step2"
        );

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({
                "email": "me@example.com",
                "secret": "s3cret",
                "url": "http://quiz.example.com/demo/step1",
                "answer": "42"
            })
        );
    }

    #[tokio::test]
    async fn test_non_2xx_is_status_error() {
        let (submit_url, _server) =
            one_shot_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = SubmissionClient::with_timeout(Duration::from_secs(5))
            .submit(&submit_url, &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_parse_error() {
        let (submit_url, _server) = one_shot_server("200 OK", "not json").await;

        let err = SubmissionClient::with_timeout(Duration::from_secs(5))
            .submit(&submit_url, &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        // 绑定后立即释放端口，连接会被拒绝
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let submit_url = Url::parse(&format!("http://{}/submit", addr)).unwrap();
        let err = SubmissionClient::with_timeout(Duration::from_secs(2))
            .submit(&submit_url, &payload())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Request { .. }));
    }
}
