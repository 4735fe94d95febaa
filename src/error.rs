//! 错误类型
//!
//! 每类外部协作方一个错误枚举，由 [`AppError`] 统一包装。
//! 致命与非致命的区分不在类型上，而在调用方：
//! `DataDownloadError` / `DecodeError` 在采集层被吸收，其余错误会终止当前链。

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 页面获取/解析错误（致命）
    #[error("页面获取错误: {0}")]
    Fetch(#[from] FetchError),
    /// 数据下载错误（非致命）
    #[error("数据下载错误: {0}")]
    DataDownload(#[from] DataDownloadError),
    /// 解码错误（非致命）
    #[error("解码错误: {0}")]
    Decode(#[from] DecodeError),
    /// 推理服务错误（致命）
    #[error("推理服务错误: {0}")]
    Reasoning(#[from] ReasoningError),
    /// 提交错误（致命）
    #[error("提交错误: {0}")]
    Submission(#[from] SubmissionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 页面获取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 启动或连接浏览器失败
    #[error("浏览器操作失败: {source}")]
    Browser {
        #[source]
        source: BoxError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    Navigation {
        url: String,
        #[source]
        source: BoxError,
    },
    /// 页面在限定时间内没有渲染完成
    #[error("页面渲染超时 ({url}, {timeout_secs} 秒)")]
    Timeout { url: String, timeout_secs: u64 },
    /// 执行页面脚本失败
    #[error("执行页面脚本失败: {source}")]
    Script {
        #[source]
        source: BoxError,
    },
    /// 页面上没有可用文本
    #[error("页面 {url} 没有可用文本")]
    Parse { url: String },
}

impl FetchError {
    pub fn browser(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Browser {
            source: Box::new(source),
        }
    }

    pub fn navigation(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Navigation {
            url: url.into(),
            source: Box::new(source),
        }
    }

    pub fn script(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Script {
            source: Box::new(source),
        }
    }
}

/// 单个数据链接下载错误
#[derive(Debug, Error)]
pub enum DataDownloadError {
    /// 网络请求失败（含超时）
    #[error("下载 {url} 失败: {source}")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },
    /// 服务器返回非 2xx
    #[error("下载 {url} 返回状态码 {status}")]
    Status { url: String, status: u16 },
}

/// 内容解码错误
#[derive(Debug, Error)]
#[error("{kind} 内容解码失败: {message}")]
pub struct DecodeError {
    pub kind: String,
    pub message: String,
}

/// 推理服务（LLM）错误
#[derive(Debug, Error)]
pub enum ReasoningError {
    /// 构建请求失败
    #[error("构建 LLM 请求失败: {source}")]
    InvalidRequest {
        #[source]
        source: BoxError,
    },
    /// API 调用失败
    #[error("LLM API 调用失败 (模型: {model}): {source}")]
    ApiCall {
        model: String,
        #[source]
        source: BoxError,
    },
    /// 调用超时
    #[error("LLM 调用超时 (模型: {model}, {timeout_secs} 秒)")]
    Timeout { model: String, timeout_secs: u64 },
    /// 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

impl ReasoningError {
    pub fn api_call(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReasoningError::ApiCall {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

/// 答案提交错误
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// 页面上没有找到提交地址
    #[error("页面 {page_url} 上没有找到提交地址")]
    MissingSubmitUrl { page_url: String },
    /// 网络请求失败（含超时）
    #[error("提交到 {endpoint} 失败: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// 检查服务返回非 2xx
    #[error("提交接口 {endpoint} 返回状态码 {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 无法解析检查结果
    #[error("无法解析提交结果 ({endpoint}): {source}")]
    Parse {
        endpoint: String,
        #[source]
        source: BoxError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取或解析配置源（文件 / 环境变量）失败，包括类型转换失败
    #[error("加载配置失败: {0}")]
    Load(#[from] ::config::ConfigError),
    /// 缺少必需的配置项
    #[error("缺少必需配置项: {key}")]
    Missing { key: String },
    /// URL 无效
    #[error("无效的 URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
