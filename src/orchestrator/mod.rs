//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一条题目链的生命周期，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 按配置装配页面获取、数据采集、推理和提交能力
//! - 运行一条链，或在后台任务中并发运行多条链
//!
//! ### `chain_resolver` - 题目链求解器
//! - 持有会话状态和截止时间
//! - 驱动状态机：获取 → 采集 → 推理 → 提交 → 迁移
//! - 决定继续、完成还是失败
//! - 保证退出时释放资源
//!
//! ## 层次关系
//!
//! ```text
//! app (装配并运行一条链)
//!     ↓
//! chain_resolver (处理整条链)
//!     ↓
//! workflow::StepFlow (处理单道题)
//!     ↓
//! services (能力层：fetch / collect / llm / submit)
//!     ↓
//! infrastructure (基础设施：BrowserSession / JsExecutor)
//! ```

pub mod app;
pub mod chain_resolver;

pub use app::{parse_start_url, App};
pub use chain_resolver::{decide_transition, ChainResolver, Transition};
