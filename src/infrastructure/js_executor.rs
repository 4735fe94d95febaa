//! JS 执行器 - 基础设施层
//!
//! 持有单个标签页，只暴露"导航"和"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::error::FetchError;

/// JS 执行器
///
/// 职责：
/// - 持有一个 Page（标签页）
/// - 暴露 goto() / eval() 能力
/// - 不认识 QuizPage，不解析页面内容
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 导航到指定 URL（`goto` 会等待本次导航加载完成）
    pub async fn goto(&self, url: &str) -> Result<(), FetchError> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| FetchError::navigation(url, e))?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, FetchError> {
        let result = self
            .page
            .evaluate(js_code.into())
            .await
            .map_err(FetchError::script)?;
        result.into_value().map_err(FetchError::script)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, FetchError> {
        let json_value = self.eval(js_code).await?;
        serde_json::from_value(json_value).map_err(FetchError::script)
    }

    /// 关闭标签页
    pub async fn close(self) {
        if let Err(e) = self.page.close().await {
            warn!("⚠️ 关闭标签页失败: {}", e);
        }
    }
}
