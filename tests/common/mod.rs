//! 集成测试共用的脚本化替身
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use quiz_chain::config::Config;
use quiz_chain::error::{DataDownloadError, FetchError, ReasoningError, SubmissionError};
use quiz_chain::models::{LinkMap, QuizPage, SubmissionPayload, SubmissionVerdict};
use quiz_chain::orchestrator::ChainResolver;
use quiz_chain::services::{
    ContentDecoder, DataCollector, DataSource, PageFetcher, ReasoningBackend, Submitter,
};
use quiz_chain::workflow::StepFlow;

pub fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

pub fn test_config() -> Config {
    Config {
        email: "student@example.com".into(),
        secret: "s3cret".into(),
        interpret_questions: false,
        ..Config::default()
    }
}

/// 带提交链接的题目页面
pub fn quiz_page(page_url: &str, question: &str) -> QuizPage {
    let submit = url("https://quiz.example/submit");
    let links: LinkMap = [("Submit here", submit.clone())].into_iter().collect();
    QuizPage {
        url: url(page_url),
        question_text: question.to_string(),
        links,
        submit_url: Some(submit),
    }
}

pub fn verdict(correct: bool, next: Option<&str>) -> SubmissionVerdict {
    SubmissionVerdict {
        http_status: 200,
        correct,
        reason: if correct { None } else { Some("wrong".into()) },
        next_url: next.map(url),
    }
}

/// 按 URL 返回预置页面，未预置的 URL 视为解析失败
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, QuizPage>,
    pub fetches: AtomicUsize,
    pub releases: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn with_pages(pages: Vec<QuizPage>) -> Self {
        Self {
            pages: pages.into_iter().map(|p| (p.url.to_string(), p)).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<QuizPage, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Parse {
                url: url.to_string(),
            })
    }

    async fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// 固定输出的推理后端，可模拟耗时或失败
pub struct ScriptedBackend {
    output: String,
    delay: Duration,
    fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn answering(output: &str) -> Self {
        Self {
            output: output.to_string(),
            delay: Duration::ZERO,
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn slow(output: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::answering(output)
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::answering("")
        }
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(ReasoningError::EmptyContent {
                model: "scripted".into(),
            });
        }
        Ok(self.output.clone())
    }
}

/// 按顺序返回预置判定，并记录收到的请求
#[derive(Default)]
pub struct ScriptedSubmitter {
    verdicts: Mutex<VecDeque<SubmissionVerdict>>,
    pub received: Mutex<Vec<(Url, SubmissionPayload)>>,
}

impl ScriptedSubmitter {
    pub fn with_verdicts(verdicts: Vec<SubmissionVerdict>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> Vec<SubmissionPayload> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(
        &self,
        submit_url: &Url,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionVerdict, SubmissionError> {
        self.received
            .lock()
            .unwrap()
            .push((submit_url.clone(), payload.clone()));
        self.verdicts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SubmissionError::Status {
                endpoint: submit_url.to_string(),
                status: 500,
                body: "no scripted verdict left".into(),
            })
    }
}

/// 所有下载都返回同一段 CSV
pub struct StaticSource;

#[async_trait]
impl DataSource for StaticSource {
    async fn download(&self, _url: &Url) -> Result<Vec<u8>, DataDownloadError> {
        Ok(b"a,b\n1,2\n".to_vec())
    }
}

pub struct Harness {
    pub fetcher: Arc<ScriptedFetcher>,
    pub backend: Arc<ScriptedBackend>,
    pub submitter: Arc<ScriptedSubmitter>,
    pub resolver: ChainResolver,
}

pub fn harness(
    config: &Config,
    fetcher: ScriptedFetcher,
    backend: ScriptedBackend,
    submitter: ScriptedSubmitter,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let backend = Arc::new(backend);
    let submitter = Arc::new(submitter);
    let collector = DataCollector::new(
        Arc::new(StaticSource),
        Arc::new(ContentDecoder),
        config.max_datum_chars,
        config.concurrent_downloads,
    );
    let flow = StepFlow::new(
        config,
        fetcher.clone(),
        collector,
        backend.clone(),
        submitter.clone(),
    );
    Harness {
        fetcher,
        backend,
        submitter,
        resolver: ChainResolver::new(config, flow),
    }
}
