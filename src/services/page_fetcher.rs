//! 页面获取服务 - 业务能力层
//!
//! 只负责"把 URL 变成 QuizPage"：渲染页面、抽取文本和链接、找出提交地址。

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::FetchError;
use crate::infrastructure::{BrowserSession, JsExecutor};
use crate::models::{LinkMap, QuizPage};

/// 页面获取能力
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取并解析一道题目页面
    async fn fetch(&self, url: &Url) -> Result<QuizPage, FetchError>;

    /// 释放持有的外部资源；链退出时调用一次
    async fn release(&self) {}
}

/// 页面快照：渲染后的可见文本和所有 `<a>` 标签
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub anchors: Vec<RawAnchor>,
}

/// 页面上的原始链接
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawAnchor {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub text: String,
}

const SNAPSHOT_SCRIPT: &str = r#"
(() => {
    const text = document.body ? document.body.innerText : "";
    const anchors = Array.from(document.querySelectorAll("a")).map(a => ({
        href: a.getAttribute("href"),
        text: (a.innerText || "").trim()
    }));
    return { text, anchors };
})()
"#;

/// 渲染稳定检测的轮询间隔
const STABLE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 基于无头浏览器的页面获取
///
/// 浏览器在第一次获取时启动，每道题一个新标签页，用完即关；
/// 浏览器本身在 [`PageFetcher::release`] 时关闭。
pub struct BrowserPageFetcher {
    config: Config,
    session: Mutex<Option<BrowserSession>>,
}

impl BrowserPageFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            session: Mutex::new(None),
        }
    }

    /// 导航并等待页面文本稳定
    async fn render(&self, executor: &JsExecutor, url: &Url) -> Result<PageSnapshot, FetchError> {
        executor.goto(url.as_str()).await?;

        debug!("⏳ 等待 JavaScript 渲染...");
        sleep(self.config.render_settle()).await;

        let mut snapshot: PageSnapshot = executor.eval_as(SNAPSHOT_SCRIPT).await?;
        loop {
            sleep(STABLE_POLL_INTERVAL).await;
            let next: PageSnapshot = executor.eval_as(SNAPSHOT_SCRIPT).await?;
            if next.text == snapshot.text {
                return Ok(next);
            }
            debug!("页面内容仍在变化，继续等待");
            snapshot = next;
        }
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<QuizPage, FetchError> {
        let mut guard = self.session.lock().await;
        let session = match &mut *guard {
            Some(session) => session,
            slot @ None => slot.insert(BrowserSession::open(&self.config).await?),
        };

        info!("📍 正在访问: {}", url);
        let executor = JsExecutor::new(session.new_page().await?);
        let rendered = timeout(self.config.page_timeout(), self.render(&executor, url)).await;
        executor.close().await;

        let snapshot = rendered.map_err(|_| FetchError::Timeout {
            url: url.to_string(),
            timeout_secs: self.config.page_timeout_secs,
        })??;

        parse_page(url.clone(), snapshot)
    }

    async fn release(&self) {
        if let Some(session) = self.session.lock().await.take() {
            session.close().await;
        }
    }
}

/// 把页面快照整理成 QuizPage
///
/// - 链接按文档顺序保存，空文本的链接以 URL 本身作键
/// - 提交地址优先取路径含 "submit" 的链接，其次从文本中挖掘
pub fn parse_page(url: Url, snapshot: PageSnapshot) -> Result<QuizPage, FetchError> {
    let question_text = snapshot.text.trim().to_string();
    if question_text.is_empty() {
        return Err(FetchError::Parse {
            url: url.to_string(),
        });
    }

    let mut links = LinkMap::new();
    let mut submit_url = None;

    for anchor in &snapshot.anchors {
        let Some(href) = anchor.href.as_deref().map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        let absolute = match url.join(href) {
            Ok(absolute) => absolute,
            Err(e) => {
                debug!("跳过无法解析的链接 '{}': {}", href, e);
                continue;
            }
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }

        if submit_url.is_none() && absolute.path().to_ascii_lowercase().contains("submit") {
            submit_url = Some(absolute.clone());
        }

        let text = anchor.text.trim();
        let key = if text.is_empty() {
            absolute.to_string()
        } else {
            text.to_string()
        };
        links.insert(key, absolute);
    }

    if submit_url.is_none() {
        submit_url = find_submit_url_in_text(&question_text);
    }
    if submit_url.is_none() {
        warn!("⚠️ 页面 {} 上没有找到提交地址", url);
    }

    Ok(QuizPage {
        url,
        question_text,
        links,
        submit_url,
    })
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s)"'<>]+"#).expect("URL 正则无效"));

/// 从页面文本中挖掘提交地址
///
/// 取最后一个含 "submit" 的 URL；一个都没有时取文本中最后一个 URL。
pub fn find_submit_url_in_text(text: &str) -> Option<Url> {
    let urls: Vec<Url> = URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter_map(|raw| Url::parse(raw).ok())
        .collect();

    urls.iter()
        .rev()
        .find(|u| u.as_str().to_ascii_lowercase().contains("submit"))
        .or_else(|| urls.last())
        .cloned()
}
