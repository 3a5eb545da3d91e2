//! 逐题调用 LLM 并收集答案

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::error::LlmError;
use crate::models::{QuestionAnswers, QuestionRow};
use crate::services::ChatCompleter;
use crate::utils::truncate_text;
use crate::workflow::question_ctx::UploadCtx;

/// 为每道题调用一次补全并按行序收集答案
///
/// - `max_in_flight` 为 1 时严格顺序调用
/// - 大于 1 时最多同时发起这么多请求，但结果仍按行序写入，重复题目以最后一行为准
/// - 任意一题失败立即返回错误，已得到的答案全部丢弃
pub async fn answer_questions(
    completer: &dyn ChatCompleter,
    rows: &[QuestionRow],
    max_in_flight: usize,
    ctx: &UploadCtx,
    verbose: bool,
) -> Result<QuestionAnswers, LlmError> {
    let total = rows.len();
    let mut answers = QuestionAnswers::default();

    info!(
        "{} 🚀 开始提问，模型: {}，共 {} 道题",
        ctx,
        completer.model_name(),
        total
    );

    // 先生成全部（惰性的）请求 future，再交给 buffered 按行序驱动
    let calls: Vec<BoxFuture<'_, Result<(&QuestionRow, String), (&QuestionRow, LlmError)>>> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            async move {
                info!(
                    "{} 🤖 [{}/{}] 提问: {}",
                    ctx,
                    idx + 1,
                    total,
                    truncate_text(&row.question, 80)
                );
                completer
                    .complete(&row.question)
                    .await
                    .map(|answer| (row, answer))
                    .map_err(|e| (row, e))
            }
            .boxed()
        })
        .collect();

    let mut results = stream::iter(calls).buffered(max_in_flight.max(1));

    while let Some(result) = results.next().await {
        let (row, answer) = match result {
            Ok(done) => done,
            Err((row, e)) => {
                error!("{} ❌ 第 {} 行题目调用失败: {}", ctx, row.line, e);
                return Err(e);
            }
        };

        if verbose {
            info!("{} 💬 第 {} 行答案: {}", ctx, row.line, truncate_text(&answer, 120));
        }

        if answers.insert(row.question.clone(), answer).is_some() {
            warn!(
                "{} ⚠️ 第 {} 行题目与前面的行重复，答案已覆盖",
                ctx, row.line
            );
        }
    }

    Ok(answers)
}
