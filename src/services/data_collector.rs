//! 数据采集服务 - 业务能力层
//!
//! 只负责"把页面上的数据链接变成文本/字节"：按扩展名筛选、下载、解码、截断。
//! 单个链接失败不影响其他链接，也不会中断整条链。

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::task;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{DataDownloadError, DecodeError};
use crate::models::{CollectedData, CollectedDatum, DataKind, DatumContent, LinkMap};
use crate::utils::truncate_with_marker;

/// 数据下载能力
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn download(&self, url: &Url) -> Result<Vec<u8>, DataDownloadError>;
}

/// 基于 HTTP 的数据下载
pub struct HttpDataSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDataSource {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: config.download_timeout(),
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn download(&self, url: &Url) -> Result<Vec<u8>, DataDownloadError> {
        debug!("📥 下载: {}", url);
        let request_failed = |e: reqwest::Error| DataDownloadError::Request {
            url: url.to_string(),
            source: Box::new(e),
        };

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataDownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(request_failed)?;
        Ok(bytes.to_vec())
    }
}

/// 内容解码能力
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8], kind: DataKind) -> Result<String, DecodeError>;
}

/// 默认解码器：纯文本按 UTF-8（有损）解码，PDF 用 `pdf-extract` 提取文字
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentDecoder;

impl Decoder for ContentDecoder {
    fn decode(&self, bytes: &[u8], kind: DataKind) -> Result<String, DecodeError> {
        match kind {
            DataKind::Pdf => {
                // pdf-extract 遇到畸形文件可能 panic
                let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
                    pdf_extract::extract_text_from_mem(bytes)
                }));
                match extracted {
                    Ok(Ok(text)) => Ok(text),
                    Ok(Err(e)) => Err(DecodeError {
                        kind: kind.to_string(),
                        message: e.to_string(),
                    }),
                    Err(_) => Err(DecodeError {
                        kind: kind.to_string(),
                        message: "PDF 解析器异常退出".to_string(),
                    }),
                }
            }
            k if k.is_text() => Ok(String::from_utf8_lossy(bytes).into_owned()),
            other => Err(DecodeError {
                kind: other.to_string(),
                message: "不支持解码为文本".to_string(),
            }),
        }
    }
}

/// 数据采集服务
pub struct DataCollector {
    source: Arc<dyn DataSource>,
    decoder: Arc<dyn Decoder>,
    max_chars: usize,
    concurrent: bool,
}

impl DataCollector {
    pub fn new(
        source: Arc<dyn DataSource>,
        decoder: Arc<dyn Decoder>,
        max_chars: usize,
        concurrent: bool,
    ) -> Self {
        Self {
            source,
            decoder,
            max_chars,
            concurrent,
        }
    }

    /// 使用 HTTP 下载和默认解码器创建
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(HttpDataSource::new(config)),
            Arc::new(ContentDecoder),
            config.max_datum_chars,
            config.concurrent_downloads,
        )
    }

    /// 采集页面链接中的数据
    ///
    /// 只处理白名单扩展名的链接；结果按链接顺序排列，下载失败的链接被省略。
    pub async fn collect(&self, links: &LinkMap) -> CollectedData {
        let targets: Vec<(&str, &Url, DataKind)> = links
            .iter()
            .filter_map(|(text, url)| DataKind::from_url(url).map(|kind| (text, url, kind)))
            .collect();

        if targets.is_empty() {
            debug!("ⓘ 没有需要下载的数据文件");
            return CollectedData::default();
        }
        info!("📊 需要采集 {} 个数据链接", targets.len());

        let results: Vec<Option<CollectedDatum>> = if self.concurrent {
            join_all(
                targets
                    .iter()
                    .map(|(text, url, kind)| self.collect_one(text, url, *kind)),
            )
            .await
        } else {
            let mut results = Vec::with_capacity(targets.len());
            for (text, url, kind) in &targets {
                results.push(self.collect_one(text, url, *kind).await);
            }
            results
        };

        results.into_iter().flatten().collect()
    }

    async fn collect_one(
        &self,
        link_text: &str,
        url: &Url,
        kind: DataKind,
    ) -> Option<CollectedDatum> {
        let bytes = match self.source.download(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("⚠️ 数据下载失败，已跳过 [{}]: {}", link_text, e);
                return None;
            }
        };

        let (content, truncated) = if kind.is_decodable() {
            let text = self.decode_blocking(bytes, kind).await.unwrap_or_else(|e| {
                warn!("⚠️ [{}] {}，按空文本处理", link_text, e);
                String::new()
            });
            let (text, truncated) = truncate_with_marker(&text, self.max_chars);
            (DatumContent::Text(text), truncated)
        } else {
            (DatumContent::Bytes(bytes), false)
        };

        debug!(
            "✓ [{}] 采集完成: {} ({}{})",
            link_text,
            kind,
            content.len(),
            if truncated { ", 已截断" } else { "" }
        );

        Some(CollectedDatum {
            source_link_text: link_text.to_string(),
            source_url: url.clone(),
            kind,
            content,
            truncated,
        })
    }

    /// 在阻塞线程池中解码（PDF 解析是 CPU 密集型）
    async fn decode_blocking(&self, bytes: Vec<u8>, kind: DataKind) -> Result<String, DecodeError> {
        let decoder = Arc::clone(&self.decoder);
        task::spawn_blocking(move || decoder.decode(&bytes, kind))
            .await
            .unwrap_or_else(|e| {
                Err(DecodeError {
                    kind: kind.to_string(),
                    message: format!("解码任务异常退出: {e}"),
                })
            })
    }
}
