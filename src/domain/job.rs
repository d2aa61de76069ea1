use crate::domain::summary::TemplateVariables;
use crate::infra::queue::JobQueue;
use crate::types::{InfraError, QpResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

/// テンプレート変数の更新キューに流すメッセージ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub article: String,
    pub template_variables: Map<String, Value>,
}

impl QueueMessage {
    /// キューのメッセージ本文を解析する
    pub fn from_body(body: &str) -> QpResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| InfraError::serialization("キューメッセージの解析", e).into())
    }

    pub fn to_body(&self) -> QpResult<String> {
        serde_json::to_string(self)
            .map_err(|e| InfraError::serialization("キューメッセージの生成", e).into())
    }
}

/// テンプレート変数をキューへ送り、メッセージIDを返す
pub async fn enqueue_template_variables(
    queue: &dyn JobQueue,
    article: &str,
    variables: &TemplateVariables,
) -> QpResult<String> {
    let message = QueueMessage {
        article: article.to_string(),
        template_variables: variables.to_map(),
    };
    let message_id = queue.send(&message.to_body()?).await?;
    info!(article, message_id = %message_id, "テンプレート変数をキューへ送信しました");
    Ok(message_id)
}
