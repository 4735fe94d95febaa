//! 链会话与状态

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::time::Instant;
use url::Url;
use uuid::Uuid;

/// 链的最终/当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Running,
    Done,
    Failed,
    TimedOut,
}

impl ChainStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ChainStatus::Running)
    }
}

impl fmt::Display for ChainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainStatus::Running => "RUNNING",
            ChainStatus::Done => "DONE",
            ChainStatus::Failed => "FAILED",
            ChainStatus::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

/// 单轮循环内的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Fetching,
    Collecting,
    Reasoning,
    Submitting,
    Transitioning,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainState::Fetching => "FETCHING",
            ChainState::Collecting => "COLLECTING",
            ChainState::Reasoning => "REASONING",
            ChainState::Submitting => "SUBMITTING",
            ChainState::Transitioning => "TRANSITIONING",
        };
        f.write_str(s)
    }
}

/// 一次触发对应的链会话
///
/// 只属于一次循环执行，循环退出即销毁。`deadline` 创建时确定，之后不再改变。
pub struct ChainSession {
    pub session_id: Uuid,
    pub caller_email: String,
    pub caller_secret: String,
    pub start_url: Url,
    /// 始终是绝对 URL
    pub current_url: Url,
    pub step_count: usize,
    pub status: ChainStatus,
    started_wall: DateTime<Local>,
    started_at: Instant,
    deadline: Instant,
}

impl ChainSession {
    pub fn new(
        caller_email: impl Into<String>,
        caller_secret: impl Into<String>,
        start_url: Url,
        budget: Duration,
    ) -> Self {
        let started_at = Instant::now();
        Self {
            session_id: Uuid::new_v4(),
            caller_email: caller_email.into(),
            caller_secret: caller_secret.into(),
            current_url: start_url.clone(),
            start_url,
            step_count: 0,
            status: ChainStatus::Running,
            started_wall: Local::now(),
            started_at,
            deadline: started_at + budget,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn started_wall(&self) -> DateTime<Local> {
        self.started_wall
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// 距截止时间的剩余时间，过期后为零
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

impl fmt::Debug for ChainSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSession")
            .field("session_id", &self.session_id)
            .field("caller_email", &self.caller_email)
            .field("caller_secret", &"***")
            .field("start_url", &self.start_url.as_str())
            .field("current_url", &self.current_url.as_str())
            .field("step_count", &self.step_count)
            .field("status", &self.status)
            .finish()
    }
}

/// 链结束后的报告
#[derive(Debug, Clone)]
pub struct ChainReport {
    pub session_id: Uuid,
    pub status: ChainStatus,
    pub step_count: usize,
    /// 判定为正确的题目数
    pub correct_count: usize,
    pub start_url: Url,
    pub last_url: Url,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    /// 失败原因（仅 `Failed` 时存在）
    pub failure: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(budget: Duration) -> ChainSession {
        ChainSession::new(
            "me@example.com",
            "s3cret",
            Url::parse("http://x/start").unwrap(),
            budget,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_fixed_at_creation() {
        let s = session(Duration::from_secs(60));
        let deadline = s.deadline();

        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(s.deadline(), deadline);
        assert_eq!(s.remaining(), Duration::from_secs(15));
        assert!(!s.is_expired());

        tokio::time::advance(Duration::from_secs(15)).await;
        assert!(s.is_expired());
        assert_eq!(s.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_new_session_starts_at_start_url() {
        let s = session(Duration::from_secs(180));
        assert_eq!(s.current_url, s.start_url);
        assert_eq!(s.step_count, 0);
        assert_eq!(s.status, ChainStatus::Running);
        assert!(!s.status.is_terminal());
    }

    #[test]
    fn test_debug_hides_secret() {
        let s = session(Duration::from_secs(180));
        assert!(!format!("{:?}", s).contains("s3cret"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ChainStatus::TimedOut.to_string(), "TIMED_OUT");
        assert_eq!(ChainState::Submitting.to_string(), "SUBMITTING");
    }
}
