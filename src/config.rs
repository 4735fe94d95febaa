//! 程序配置
//!
//! 启动时构建一次，之后只读，以 `Arc<Config>` 共享给每条链。
//! 优先级（低 → 高）：内置默认值 → TOML 配置文件 → `QUIZ_` 前缀的环境变量。

use std::time::Duration;

use ::config::{Environment, File, FileFormat, Source};
use serde::Deserialize;

use crate::error::ConfigError;

/// 配置文件路径的环境变量名
pub const CONFIG_PATH_VAR: &str = "QUIZ_CONFIG";
/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "quiz_chain.toml";
/// 环境变量前缀：`QUIZ_CHAIN_BUDGET_SECS` → `chain_budget_secs`
pub const ENV_PREFIX: &str = "QUIZ";

/// 程序配置
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 调用方凭据 ---
    pub email: String,
    pub secret: String,
    /// 起始 URL（命令行参数优先）
    pub start_url: Option<String>,
    // --- 链路时间预算 ---
    /// 整条链的时间预算（秒）
    pub chain_budget_secs: u64,
    /// 答错时继续下一题所需的最少剩余时间（秒）
    pub safety_margin_secs: u64,
    // --- 页面获取 ---
    /// 单个页面渲染超时（秒）
    pub page_timeout_secs: u64,
    /// 导航完成后等待脚本渲染的时间（毫秒）
    pub render_settle_millis: u64,
    /// 连接已运行的浏览器调试端口；为空则自行启动无头浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    // --- 数据采集 ---
    pub download_timeout_secs: u64,
    /// 单个数据文件保留的最大字符数
    pub max_datum_chars: usize,
    /// 是否并发下载数据链接
    pub concurrent_downloads: bool,
    // --- 推理 ---
    /// 提示词中每个数据项的最大字符数
    pub prompt_datum_chars: usize,
    /// 解题前是否先让 LLM 拆解题目
    pub interpret_questions: bool,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
    // --- 提交 ---
    pub submit_timeout_secs: u64,
    // --- 日志 ---
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: String::new(),
            secret: String::new(),
            start_url: None,
            chain_budget_secs: 180,
            safety_margin_secs: 30,
            page_timeout_secs: 30,
            render_settle_millis: 2000,
            browser_debug_port: None,
            chrome_executable: None,
            download_timeout_secs: 30,
            max_datum_chars: 5000,
            concurrent_downloads: true,
            prompt_datum_chars: 5000,
            interpret_questions: true,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4-turbo".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 2048,
            llm_timeout_secs: 120,
            submit_timeout_secs: 10,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：`.env` → 配置文件 → `QUIZ_*` 环境变量，最后校验
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::layered(
            File::new(&path, FileFormat::Toml).required(false),
            Environment::with_prefix(ENV_PREFIX),
        )?
        .with_api_key_fallback(std::env::var("OPENAI_API_KEY").ok());

        config.validate()?;
        Ok(config)
    }

    /// 按 默认值 → `file` → `env` 的顺序叠加配置源
    ///
    /// 未出现的字段取默认值；数值类型转换失败返回 [`ConfigError::Load`]。
    pub fn layered<S>(file: S, env: Environment) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let config = ::config::Config::builder()
            .add_source(file)
            .add_source(env.ignore_empty(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// 未配置 `llm_api_key` 时使用备用密钥（通常是 `OPENAI_API_KEY`）
    pub fn with_api_key_fallback(mut self, fallback: Option<String>) -> Self {
        if self.llm_api_key.trim().is_empty() {
            if let Some(key) = fallback.filter(|k| !k.trim().is_empty()) {
                self.llm_api_key = key;
            }
        }
        self
    }

    /// 校验必需的凭据
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("email", &self.email), ("secret", &self.secret)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn chain_budget(&self) -> Duration {
        Duration::from_secs(self.chain_budget_secs)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_millis)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }
}
