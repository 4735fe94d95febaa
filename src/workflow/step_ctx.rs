//! 单步处理上下文
//!
//! 封装"我正在处理哪条链的第几题"这一信息

use std::fmt::Display;

use url::Url;
use uuid::Uuid;

use crate::models::ChainSession;

/// 单步处理上下文
#[derive(Debug, Clone)]
pub struct StepCtx {
    /// 会话ID
    pub session_id: Uuid,
    /// 第几轮（从1开始）
    pub iteration: usize,
    /// 当前题目 URL
    pub url: Url,
}

impl StepCtx {
    pub fn from_session(session: &ChainSession) -> Self {
        Self {
            session_id: session.session_id,
            iteration: session.step_count,
            url: session.current_url.clone(),
        }
    }
}

impl Display for StepCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.session_id.simple().to_string();
        write!(f, "[链 {} 第{}题]", &id[..8], self.iteration)
    }
}
