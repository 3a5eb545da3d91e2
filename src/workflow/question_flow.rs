//! 上传处理流程 - 流程层
//!
//! 核心职责：定义"一个上传文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验 API Key 和文件名
//! 2. 打开 ZIP → 找到唯一 CSV → 解压到临时目录 → 解析题目
//! 3. 逐题调用 LLM
//! 4. 删除临时目录，返回答案

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::infrastructure::ScratchDir;
use crate::models::{load_question_table, QuestionAnswers, QuestionTable, UploadedArchive};
use crate::services::{archive_intake, ArchiveIntake, ChatCompleter};
use crate::workflow::dispatch::answer_questions;
use crate::workflow::question_ctx::UploadCtx;

/// 上传处理流程
///
/// - 编排完整的处理流程
/// - 持有注入的 LLM 能力，不持有任何请求级资源
/// - 临时目录在流程内创建，任何出口都会被删除
pub struct QuestionFlow {
    completer: Arc<dyn ChatCompleter>,
    api_key_present: bool,
    scratch_root: PathBuf,
    max_concurrent_questions: usize,
    verbose_logging: bool,
}

impl QuestionFlow {
    /// 创建新的处理流程
    pub fn new(config: &Config, completer: Arc<dyn ChatCompleter>) -> Self {
        Self {
            completer,
            api_key_present: config.has_api_key(),
            scratch_root: config.scratch_dir.clone(),
            max_concurrent_questions: config.max_concurrent_questions.max(1),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一个上传文件
    pub async fn run(&self, upload: UploadedArchive, ctx: &UploadCtx) -> AppResult<QuestionAnswers> {
        let result = self.process(upload, ctx).await;
        match &result {
            Ok(answers) => info!("{} ✅ 处理完成，共 {} 个答案", ctx, answers.len()),
            Err(e) if e.is_input() => info!("{} ⚠️ 请求被拒绝: {}", ctx, e),
            Err(e) => error!("{} ❌ 处理失败: {}", ctx, e),
        }
        result
    }

    async fn process(&self, upload: UploadedArchive, ctx: &UploadCtx) -> AppResult<QuestionAnswers> {
        if !self.api_key_present {
            return Err(ConfigError::MissingApiKey.into());
        }
        archive_intake::check_file_name(&upload.file_name)?;

        info!("{} 📦 收到上传文件 ({} 字节)", ctx, upload.bytes.len());

        // ZIP 与 CSV 解析都是阻塞 IO，放到阻塞线程池执行
        let scratch_root = self.scratch_root.clone();
        let (scratch, table) =
            tokio::task::spawn_blocking(move || extract_questions(upload, &scratch_root)).await??;

        info!(
            "{} 📄 CSV 读取成功: {} 道题 (跳过 {} 个空行)",
            ctx,
            table.len(),
            table.skipped_blank
        );

        // scratch 在此作用域结束前一直存在，出错返回时由 drop 删除
        let answers = answer_questions(
            self.completer.as_ref(),
            &table.rows,
            self.max_concurrent_questions,
            ctx,
            self.verbose_logging,
        )
        .await?;

        scratch.close();
        Ok(answers)
    }
}

/// 打开压缩包、解压唯一的 CSV 并读取题目
fn extract_questions(
    upload: UploadedArchive,
    scratch_root: &std::path::Path,
) -> AppResult<(ScratchDir, QuestionTable)> {
    let mut intake = ArchiveIntake::open(upload.bytes)?;
    let entry = intake.single_csv_entry()?;

    let scratch = ScratchDir::create_in(scratch_root)?;
    let csv_path = intake.extract_entry(&entry, &scratch)?;
    let table = load_question_table(&csv_path)?;

    Ok((scratch, table))
}
