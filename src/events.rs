//! 链路步骤事件
//!
//! 求解循环通过 [`EventBus::emit`] 发布结构化事件，外部观测方通过
//! [`EventBus::subscribe`] 订阅。基于 [`tokio::sync::broadcast`]，
//! 没有订阅者时发布是空操作。

use std::time::Duration;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{ChainState, ChainStatus};

/// 链路事件
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    /// 会话创建
    ChainStarted { session_id: Uuid, start_url: String },
    /// 进入某个阶段
    StateEntered {
        session_id: Uuid,
        iteration: usize,
        state: ChainState,
        elapsed: Duration,
    },
    /// 一道题提交完成并拿到判定
    StepCompleted {
        session_id: Uuid,
        iteration: usize,
        url: String,
        correct: bool,
        elapsed: Duration,
    },
    /// 循环退出
    ChainFinished {
        session_id: Uuid,
        status: ChainStatus,
        steps: usize,
        elapsed: Duration,
    },
}

/// 广播通道，任意组件都可以发布或订阅
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChainEvent>,
}

impl EventBus {
    /// 指定通道容量创建
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// 发布事件，返回将收到该事件的订阅者数量
    pub fn emit(&self, event: ChainEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// 订阅之后发布的事件（不回放历史事件）
    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
