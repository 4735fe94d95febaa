//! # Quiz Chain
//!
//! 自动求解题目链：打开题目页面，采集附带数据，让 LLM 推理答案，
//! 提交到检查服务，并按返回结果跳到下一题，直到完成、失败或超时。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Browser / Page），只暴露能力
//! - `BrowserSession` - 启动或连接无头浏览器
//! - `JsExecutor` - 唯一的 page owner，提供 goto() / eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力都在 trait 之后
//! - `PageFetcher` - 渲染页面并提取题目、链接和提交地址
//! - `DataCollector` - 下载并解码数据文件
//! - `ReasoningBackend` - LLM 推理能力
//! - `answer_extractor` - 从推理输出中提取答案
//! - `Submitter` - 提交答案并解析判定
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `StepCtx` - 上下文封装（session_id + iteration）
//! - `StepFlow` - 流程编排（fetch → collect → reason → submit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/chain_resolver` - 状态机、截止时间、下一题决策
//! - `orchestrator/app` - 按配置装配并运行一条链
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod events;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use events::{ChainEvent, EventBus};
pub use models::{ChainReport, ChainStatus, QuizPage};
pub use orchestrator::{App, ChainResolver};
pub use workflow::{StepCtx, StepFlow};
