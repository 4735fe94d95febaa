//! 浏览器会话 - 基础设施层
//!
//! 持有 `Browser` 和它的事件处理任务。每条链一个会话，链结束时调用 [`BrowserSession::close`]。

use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::FetchError;

/// 浏览器会话
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    /// 是否由本进程启动（连接到外部浏览器时不负责关闭它）
    owned: bool,
}

impl BrowserSession {
    /// 按配置启动无头浏览器，或连接到已有的调试端口
    pub async fn open(config: &Config) -> Result<Self, FetchError> {
        match config.browser_debug_port {
            Some(port) => Self::connect(port).await,
            None => Self::launch(config).await,
        }
    }

    /// 启动无头浏览器
    pub async fn launch(config: &Config) -> Result<Self, FetchError> {
        info!("🚀 启动无头浏览器...");

        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .request_timeout(config.page_timeout())
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
            ]);
        if let Some(exe) = &config.chrome_executable {
            debug!("浏览器可执行文件: {}", exe);
            builder = builder.chrome_executable(Path::new(exe));
        }

        let browser_config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            FetchError::browser(std::io::Error::other(e))
        })?;

        let (browser, handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            FetchError::browser(e)
        })?;
        debug!("无头浏览器启动成功");

        Ok(Self {
            browser,
            handler: spawn_handler(handler),
            owned: true,
        })
    }

    /// 连接到已运行浏览器的调试端口
    pub async fn connect(port: u16) -> Result<Self, FetchError> {
        let browser_url = format!("http://localhost:{}", port);
        info!("正在连接到浏览器: {}", browser_url);

        let (browser, handler) = Browser::connect(&browser_url).await.map_err(|e| {
            error!("连接浏览器失败: {}", e);
            FetchError::browser(e)
        })?;
        let handler = spawn_handler(handler);

        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;
        debug!("浏览器连接成功");

        Ok(Self {
            browser,
            handler,
            owned: false,
        })
    }

    /// 打开一个空白标签页
    pub async fn new_page(&self) -> Result<Page, FetchError> {
        self.browser.new_page("about:blank").await.map_err(|e| {
            error!("创建新页面失败: {}", e);
            FetchError::browser(e)
        })
    }

    /// 释放浏览器资源
    pub async fn close(mut self) {
        if self.owned {
            if let Err(e) = self.browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
            if let Err(e) = self.browser.wait().await {
                warn!("⚠️ 等待浏览器进程退出失败: {}", e);
            }
        }
        self.handler.abort();
        info!("✓ 浏览器已释放");
    }
}

/// 在后台处理浏览器事件
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}
