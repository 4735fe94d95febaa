//! 应用入口 - 编排层
//!
//! 负责把配置装配成一条完整的求解链：
//! 浏览器页面获取、数据采集、LLM 推理、答案提交。
//!
//! 每次运行都创建新的求解器，因此多条链可以并发运行、互不共享状态。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::events::EventBus;
use crate::models::ChainReport;
use crate::orchestrator::chain_resolver::ChainResolver;
use crate::services::{BrowserPageFetcher, DataCollector, LlmService, SubmissionClient};
use crate::workflow::StepFlow;

/// 应用主结构
pub struct App {
    config: Arc<Config>,
    events: EventBus,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            events: EventBus::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 所有链共用的事件总线
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// 按配置装配一个求解器（浏览器在第一次获取页面时才启动）
    pub fn build_resolver(&self) -> ChainResolver {
        let config = self.config.as_ref();
        let flow = StepFlow::new(
            config,
            Arc::new(BrowserPageFetcher::new(config)),
            DataCollector::from_config(config),
            Arc::new(LlmService::new(config)),
            Arc::new(SubmissionClient::new(config)),
        );
        ChainResolver::new(config, flow).with_events(self.events.clone())
    }

    /// 运行一条链直到终止
    pub async fn run_chain(
        &self,
        email: &str,
        secret: &str,
        start_url: &str,
    ) -> AppResult<ChainReport> {
        let start_url = parse_start_url(start_url)?;
        info!("🚀 起始页面: {}", start_url);
        Ok(self.build_resolver().resolve(email, secret, start_url).await)
    }

    /// 在后台任务中运行一条链
    pub fn spawn_chain(
        self: &Arc<Self>,
        email: String,
        secret: String,
        start_url: String,
    ) -> JoinHandle<AppResult<ChainReport>> {
        let app = Arc::clone(self);
        tokio::spawn(async move { app.run_chain(&email, &secret, &start_url).await })
    }
}

/// 解析起始 URL，只接受 http(s)
pub fn parse_start_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_parse_start_url() {
        let url = assert_ok!(parse_start_url(" https://quiz.example/q1 "));
        assert_eq!(url.as_str(), "https://quiz.example/q1");
        assert_err!(parse_start_url("not a url"));
        assert_err!(parse_start_url("file:///etc/passwd"));
    }

    #[tokio::test]
    async fn test_resolver_shares_app_event_bus() {
        let app = App::new(Config::default());
        let mut rx = app.events().subscribe();
        let resolver = app.build_resolver();

        resolver.events().emit(crate::events::ChainEvent::ChainStarted {
            session_id: uuid::Uuid::nil(),
            start_url: "https://quiz.example/q1".to_string(),
        });
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_run_chain_rejects_bad_url() {
        let app = App::new(Config::default());
        let err = app.run_chain("a@b.c", "s", "::nope::").await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_spawned_chain_reports_bad_url() {
        let app = Arc::new(App::new(Config::default()));
        let handle = app.spawn_chain("a@b.c".into(), "s".into(), "relative/path".into());
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
