//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词变成回答"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ReasoningError;

/// 推理能力
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// 发送提示词，返回原始文本回答
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError>;
}

const SYSTEM_MESSAGE: &str = "You are an expert data analyst. \
    Read quiz questions carefully, use the provided data, \
    and give accurate answers with clear reasoning.";

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 完成一次对话
/// - 不解析答案
/// - 不关心流程顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            timeout: config.llm_timeout(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去掉首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> Result<String, ReasoningError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let invalid = |e: async_openai::error::OpenAIError| ReasoningError::InvalidRequest {
            source: Box::new(e),
        };

        let mut messages = Vec::new();
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(invalid)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(invalid)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(invalid)?;

        let response = timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ReasoningError::Timeout {
                model: self.model_name.clone(),
                timeout_secs: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                ReasoningError::api_call(&self.model_name, e)
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ReasoningError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl ReasoningBackend for LlmService {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        self.send_to_llm(prompt, Some(SYSTEM_MESSAGE)).await
    }
}
