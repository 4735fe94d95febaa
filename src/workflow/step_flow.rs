//! 单题处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的各个阶段
//!
//! 阶段顺序：
//! 1. 获取页面 → 2. 采集数据 → 3. 推理并提取答案 → 4. 提交
//!
//! 阶段之间的状态迁移、截止时间和下一题的决定都在编排层。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{FetchError, ReasoningError, SubmissionError};
use crate::models::{AnswerCandidate, CollectedData, QuizPage, SubmissionPayload, SubmissionVerdict};
use crate::services::answer_extractor;
use crate::services::prompt::{build_interpret_prompt, build_solve_prompt};
use crate::services::{DataCollector, PageFetcher, ReasoningBackend, Submitter};
use crate::utils::truncate_text;
use crate::workflow::step_ctx::StepCtx;

/// 单题处理流程
///
/// - 编排一道题的各阶段
/// - 不持有截止时间，不做重试
/// - 只依赖业务能力（services）
pub struct StepFlow {
    fetcher: Arc<dyn PageFetcher>,
    collector: DataCollector,
    backend: Arc<dyn ReasoningBackend>,
    submitter: Arc<dyn Submitter>,
    interpret_questions: bool,
    prompt_datum_chars: usize,
}

impl StepFlow {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        collector: DataCollector,
        backend: Arc<dyn ReasoningBackend>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        Self {
            fetcher,
            collector,
            backend,
            submitter,
            interpret_questions: config.interpret_questions,
            prompt_datum_chars: config.prompt_datum_chars,
        }
    }

    /// 阶段 1：获取题目页面
    pub async fn fetch_page(&self, ctx: &StepCtx) -> Result<QuizPage, FetchError> {
        info!("{} 📄 访问题目页面: {}", ctx, ctx.url);
        let page = self.fetcher.fetch(&ctx.url).await?;

        info!("{} ✓ 题目: {}", ctx, truncate_text(&page.question_text, 120));
        info!("{} 🔗 找到 {} 个链接", ctx, page.links.len());
        for (text, url) in page.links.iter().take(5) {
            debug!("{}   - {}: {}", ctx, truncate_text(text, 40), url);
        }
        Ok(page)
    }

    /// 阶段 2：采集数据（失败的链接已在采集服务中被跳过）
    pub async fn collect_data(&self, ctx: &StepCtx, page: &QuizPage) -> CollectedData {
        let data = self.collector.collect(&page.links).await;
        for datum in data.iter() {
            info!(
                "{} ✓ 数据 {}: {} 字符{}",
                ctx,
                truncate_text(&datum.source_link_text, 40),
                datum.content.len(),
                if datum.truncated { " (已截断)" } else { "" }
            );
        }
        data
    }

    /// 阶段 3：推理并提取答案
    ///
    /// 题目拆解失败只记录警告；解题调用失败是致命错误。
    pub async fn reason(
        &self,
        ctx: &StepCtx,
        page: &QuizPage,
        data: &CollectedData,
    ) -> Result<AnswerCandidate, ReasoningError> {
        let interpretation = if self.interpret_questions {
            info!("{} 🤖 让 LLM 拆解题目...", ctx);
            match self.backend.complete(&build_interpret_prompt(&page.question_text)).await {
                Ok(text) => {
                    debug!("{} 💡 拆解结果: {}", ctx, truncate_text(&text, 300));
                    Some(text)
                }
                Err(e) => {
                    warn!("{} ⚠️ 题目拆解失败，直接解题: {}", ctx, e);
                    None
                }
            }
        } else {
            None
        };

        info!("{} 🤖 让 LLM 解题...", ctx);
        let prompt = build_solve_prompt(
            page,
            data,
            interpretation.as_deref(),
            self.prompt_datum_chars,
        );
        let output = self.backend.complete(&prompt).await?;
        debug!("{} 📊 LLM 推理过程:\n{}", ctx, output);

        let candidate = answer_extractor::extract_candidate(&output);
        if candidate.extracted_value.is_empty() {
            warn!("{} ⚠️ 没有提取到答案，将提交占位值", ctx);
        }
        info!(
            "{} ✨ 答案: {} ({:?})",
            ctx,
            candidate.submission_value(),
            candidate.extraction_method
        );
        Ok(candidate)
    }

    /// 阶段 4：提交答案
    pub async fn submit(
        &self,
        ctx: &StepCtx,
        page: &QuizPage,
        email: &str,
        secret: &str,
        answer: &AnswerCandidate,
    ) -> Result<SubmissionVerdict, SubmissionError> {
        let submit_url = page
            .submit_url
            .as_ref()
            .ok_or_else(|| SubmissionError::MissingSubmitUrl {
                page_url: page.url.to_string(),
            })?;

        info!("{} 📨 提交答案到: {}", ctx, submit_url);
        let payload = SubmissionPayload {
            email: email.to_string(),
            secret: secret.to_string(),
            url: ctx.url.clone(),
            answer: answer.submission_value().to_string(),
        };

        let verdict = self.submitter.submit(submit_url, &payload).await?;
        info!(
            "{} 📊 判定: 状态码 {}, 正确 {}, 原因 {:?}",
            ctx, verdict.http_status, verdict.correct, verdict.reason
        );
        Ok(verdict)
    }

    /// 释放页面获取所持有的资源
    pub async fn release(&self) {
        self.fetcher.release().await;
    }
}
