//! 题目链求解器 - 编排层
//!
//! ## 职责
//!
//! 持有一条链的状态机：
//!
//! ```text
//! FETCHING → COLLECTING → REASONING → SUBMITTING → TRANSITIONING
//!     ↑                                                  │
//!     └──────────────── 有下一题 ────────────────────────┘
//!                                     退出: DONE / FAILED / TIMED_OUT
//! ```
//!
//! ## 规则
//!
//! 1. 截止时间只在每轮开始时检查，进行中的外部调用不会被打断，
//!    因此实际耗时最多超出预算一个步骤自身的超时
//! 2. 任何阶段的致命错误立即结束整条链（FAILED），不在原地重试
//! 3. 答错时唯一的出路是检查服务给出的下一题，且剩余时间需大于安全余量
//! 4. 无论以何种方式退出，页面获取的资源都恰好释放一次

use std::time::Duration;

use tracing::{error, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::AppError;
use crate::events::{ChainEvent, EventBus};
use crate::models::{ChainReport, ChainSession, ChainState, ChainStatus, SubmissionVerdict};
use crate::workflow::{StepCtx, StepFlow};

/// 判定之后的去向
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 继续处理下一题
    Continue(Url),
    /// 整条链完成
    Done,
    /// 答错且无法继续
    Stop,
}

/// 根据判定和剩余时间决定下一步
pub fn decide_transition(
    verdict: &SubmissionVerdict,
    remaining: Duration,
    safety_margin: Duration,
) -> Transition {
    match (verdict.correct, &verdict.next_url) {
        (true, Some(next)) => Transition::Continue(next.clone()),
        (true, None) => Transition::Done,
        (false, Some(next)) if remaining > safety_margin => Transition::Continue(next.clone()),
        (false, _) => Transition::Stop,
    }
}

/// 循环的正常退出方式（致命错误走 `Err`）
enum LoopExit {
    Done,
    TimedOut,
    Rejected(String),
}

/// 题目链求解器
pub struct ChainResolver {
    flow: StepFlow,
    budget: Duration,
    safety_margin: Duration,
    events: EventBus,
}

impl ChainResolver {
    pub fn new(config: &Config, flow: StepFlow) -> Self {
        Self {
            flow,
            budget: config.chain_budget(),
            safety_margin: config.safety_margin(),
            events: EventBus::default(),
        }
    }

    /// 使用外部提供的事件总线
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// 从起始 URL 开始求解整条链
    ///
    /// 不返回错误：失败体现在报告的状态和失败原因中。
    pub async fn resolve(&self, email: &str, secret: &str, start_url: Url) -> ChainReport {
        let mut session = ChainSession::new(email, secret, start_url, self.budget);
        info!(
            session = %session.session_id,
            start_url = %session.start_url,
            budget_secs = self.budget.as_secs(),
            "🔍 开始处理题目链"
        );
        self.events.emit(ChainEvent::ChainStarted {
            session_id: session.session_id,
            start_url: session.start_url.to_string(),
        });

        let mut correct_count = 0;
        let failure = match self.drive(&mut session, &mut correct_count).await {
            Ok(LoopExit::Done) => {
                session.status = ChainStatus::Done;
                None
            }
            Ok(LoopExit::TimedOut) => {
                session.status = ChainStatus::TimedOut;
                None
            }
            Ok(LoopExit::Rejected(reason)) => {
                session.status = ChainStatus::Failed;
                Some(reason)
            }
            Err(e) => {
                error!(
                    session = %session.session_id,
                    iteration = session.step_count,
                    error = %e,
                    "❌ 题目链处理失败"
                );
                session.status = ChainStatus::Failed;
                Some(e.to_string())
            }
        };

        info!(session = %session.session_id, "🧹 正在释放资源...");
        self.flow.release().await;

        let elapsed = session.elapsed();
        info!(
            session = %session.session_id,
            status = %session.status,
            steps = session.step_count,
            elapsed_ms = elapsed.as_millis() as u64,
            "✨ 题目链结束"
        );
        self.events.emit(ChainEvent::ChainFinished {
            session_id: session.session_id,
            status: session.status,
            steps: session.step_count,
            elapsed,
        });

        ChainReport {
            session_id: session.session_id,
            status: session.status,
            step_count: session.step_count,
            correct_count,
            start_url: session.start_url.clone(),
            last_url: session.current_url.clone(),
            started_at: session.started_wall(),
            elapsed,
            failure,
        }
    }

    async fn drive(
        &self,
        session: &mut ChainSession,
        correct_count: &mut usize,
    ) -> Result<LoopExit, AppError> {
        loop {
            if session.is_expired() {
                warn!(
                    session = %session.session_id,
                    iteration = session.step_count,
                    elapsed_ms = session.elapsed().as_millis() as u64,
                    "⏱️ 已超过截止时间，停止处理"
                );
                return Ok(LoopExit::TimedOut);
            }

            session.step_count += 1;
            let ctx = StepCtx::from_session(session);
            info!("\n{} {}", ctx, "─".repeat(30));
            info!(
                "{} 🔍 开始处理 (已用 {:.1}s / 剩余 {:.1}s)",
                ctx,
                session.elapsed().as_secs_f64(),
                session.remaining().as_secs_f64()
            );

            self.enter(session, ChainState::Fetching);
            let page = self.flow.fetch_page(&ctx).await?;

            self.enter(session, ChainState::Collecting);
            let data = self.flow.collect_data(&ctx, &page).await;

            self.enter(session, ChainState::Reasoning);
            let answer = self.flow.reason(&ctx, &page, &data).await?;

            self.enter(session, ChainState::Submitting);
            let verdict = self
                .flow
                .submit(
                    &ctx,
                    &page,
                    &session.caller_email,
                    &session.caller_secret,
                    &answer,
                )
                .await?;
            let outcome = if verdict.correct {
                *correct_count += 1;
                "correct"
            } else {
                "incorrect"
            };
            info!(
                session = %session.session_id,
                iteration = session.step_count,
                outcome,
                elapsed_ms = session.elapsed().as_millis() as u64,
                "步骤完成"
            );
            self.events.emit(ChainEvent::StepCompleted {
                session_id: session.session_id,
                iteration: session.step_count,
                url: ctx.url.to_string(),
                correct: verdict.correct,
                elapsed: session.elapsed(),
            });

            self.enter(session, ChainState::Transitioning);
            match decide_transition(&verdict, session.remaining(), self.safety_margin) {
                Transition::Continue(next) => {
                    if verdict.correct {
                        info!("{} ✅ 回答正确，进入下一题: {}", ctx, next);
                    } else {
                        info!("{} ❌ 回答错误，跳到检查服务给出的下一题: {}", ctx, next);
                    }
                    session.current_url = next;
                }
                Transition::Done => {
                    info!("{} 🎉 回答正确，没有更多题目", ctx);
                    return Ok(LoopExit::Done);
                }
                Transition::Stop => {
                    let reason = match &verdict.next_url {
                        Some(_) => format!(
                            "答案错误，剩余时间 {:.1}s 不足安全余量 {}s",
                            session.remaining().as_secs_f64(),
                            self.safety_margin.as_secs()
                        ),
                        None => format!(
                            "答案错误且没有下一题 (原因: {})",
                            verdict.reason.as_deref().unwrap_or("未提供")
                        ),
                    };
                    warn!("{} ❌ {}", ctx, reason);
                    return Ok(LoopExit::Rejected(reason));
                }
            }
        }
    }

    fn enter(&self, session: &ChainSession, state: ChainState) {
        let elapsed = session.elapsed();
        info!(
            session = %session.session_id,
            iteration = session.step_count,
            state = %state,
            elapsed_ms = elapsed.as_millis() as u64,
            "进入阶段"
        );
        self.events.emit(ChainEvent::StateEntered {
            session_id: session.session_id,
            iteration: session.step_count,
            state,
            elapsed,
        });
    }
}
