use crate::app::context::AppContext;
use crate::app::handler::with_logging;
use crate::domain::article::{put_article_template_variables, TemplateRecord};
use crate::domain::job::QueueMessage;
use crate::infra::queue::{QueueRecord, SqsEvent};
use crate::types::{InfraError, QpResult};
use serde_json::json;
use tracing::info;

/// LambdaのSQSイベントを処理する
pub async fn consume_event(ctx: &AppContext, event: SqsEvent) -> QpResult<Vec<TemplateRecord>> {
    with_logging("consume_event", event, |event| async move {
        consume_records(ctx, &event.records).await
    })
    .await
}

/// キューのメッセージをまとめて処理する
///
/// バッチ内の全メッセージを順に処理し、更新後のレコードを返す。
/// 途中で失敗した場合はそこで中止してエラーを返す（残りはキューの再配信に任せる）。
pub async fn consume_records(
    ctx: &AppContext,
    records: &[QueueRecord],
) -> QpResult<Vec<TemplateRecord>> {
    let mut updated = Vec::with_capacity(records.len());
    for record in records {
        updated.push(consume_record(ctx, record).await?);
    }
    Ok(updated)
}

/// 1件のメッセージを記事ストアへ書き込み、公開ワークフローを開始する
///
/// 書き込みは上書きなので再配信されても結果は同じ。ワークフローは再配信の度に開始される。
pub async fn consume_record(ctx: &AppContext, record: &QueueRecord) -> QpResult<TemplateRecord> {
    let message = QueueMessage::from_body(&record.body)?;

    let updated = put_article_template_variables(
        ctx.store.as_ref(),
        &message.article,
        &message.template_variables,
    )
    .await?;

    let input = json!({ "article": message.article }).to_string();
    let name = &ctx.settings.publisher_statemachine_name;
    let execution = ctx.orchestrator.start_execution(name, &input).await?;
    info!(
        message_id = %record.message_id,
        statemachine = %name,
        input = %input,
        execution_arn = %execution.execution_arn,
        "ステートマシンを実行しました"
    );

    Ok(updated)
}

/// キューを1回ポーリングして処理する
///
/// 処理に成功したメッセージだけを削除する。失敗したメッセージは残して再配信させ、エラーを返す。
pub async fn poll_queue(ctx: &AppContext, max_messages: i32) -> QpResult<Vec<TemplateRecord>> {
    let records = ctx.queue.receive(max_messages).await?;
    info!(count = records.len(), "キューからメッセージを受信しました");

    with_logging("poll_queue", SqsEvent { records }, |event| async move {
        let mut updated = Vec::with_capacity(event.records.len());
        for record in &event.records {
            updated.push(consume_record(ctx, record).await?);
            ctx.queue.done(&record.receipt_handle).await?;
        }
        Ok(updated)
    })
    .await
}

/// JSON文字列からSQSイベントを読み込む
pub fn parse_event(raw: &str) -> QpResult<SqsEvent> {
    serde_json::from_str(raw).map_err(|e| InfraError::serialization("SQSイベントの解析", e).into())
}
