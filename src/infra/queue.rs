use crate::types::{InfraError, InfraResult};
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQSのロングポーリング待機秒数
const RECEIVE_WAIT_SECONDS: i32 = 20;

/// キューから受け取ったメッセージ
///
/// LambdaのSQSイベントのレコードと同じ形をしている。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub receipt_handle: String,
    pub body: String,
}

/// LambdaのSQSイベント
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueRecord>,
}

/// SQSのキューURLを組み立てる
pub fn queue_url(account_id: &str, region: &str, queue_name: &str) -> String {
    format!(
        "https://sqs.{}.amazonaws.com/{}/{}",
        region, account_id, queue_name
    )
}

/// ジョブキューの抽象化トレイト
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// メッセージを送信し、メッセージIDを返す
    async fn send(&self, body: &str) -> InfraResult<String>;

    /// 最大 `max_messages` 件のメッセージを受信する
    async fn receive(&self, max_messages: i32) -> InfraResult<Vec<QueueRecord>>;

    /// 処理が完了したメッセージをキューから削除する
    async fn done(&self, receipt_handle: &str) -> InfraResult<()>;
}

/// SQSを使うジョブキュー
pub struct SqsJobQueue {
    client: Client,
    queue_url: String,
}

impl SqsJobQueue {
    pub fn new<U: Into<String>>(client: Client, queue_url: U) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

#[async_trait]
impl JobQueue for SqsJobQueue {
    async fn send(&self, body: &str) -> InfraResult<String> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| InfraError::sqs("send_message", e))?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }

    async fn receive(&self, max_messages: i32) -> InfraResult<Vec<QueueRecord>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages.clamp(1, 10))
            .wait_time_seconds(RECEIVE_WAIT_SECONDS)
            .send()
            .await
            .map_err(|e| InfraError::sqs("receive_message", e))?;

        Ok(output
            .messages()
            .iter()
            .map(|message| QueueRecord {
                message_id: message.message_id().unwrap_or_default().to_string(),
                receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
                body: message.body().unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn done(&self, receipt_handle: &str) -> InfraResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| InfraError::sqs("delete_message", e))?;
        Ok(())
    }
}

/// メモリ上のジョブキュー（テスト・ローカル実行用）
///
/// 受信したメッセージは `done` されるまで処理中として残る。
#[derive(Default)]
pub struct MemoryJobQueue {
    state: Mutex<MemoryQueueState>,
}

#[derive(Default)]
struct MemoryQueueState {
    next_id: u64,
    pending: VecDeque<QueueRecord>,
    in_flight: Vec<QueueRecord>,
    sent: Vec<String>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryQueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// これまでに送信されたメッセージ本文
    pub fn sent_bodies(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    /// 受信済みで未削除のメッセージ数
    pub fn in_flight_len(&self) -> usize {
        self.state().in_flight.len()
    }

    /// 未受信のメッセージ数
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn send(&self, body: &str) -> InfraResult<String> {
        let mut state = self.state();
        state.next_id += 1;
        let message_id = format!("message-{}", state.next_id);
        let receipt_handle = format!("receipt-{}", state.next_id);
        state.pending.push_back(QueueRecord {
            message_id: message_id.clone(),
            receipt_handle,
            body: body.to_string(),
        });
        state.sent.push(body.to_string());
        Ok(message_id)
    }

    async fn receive(&self, max_messages: i32) -> InfraResult<Vec<QueueRecord>> {
        let mut state = self.state();
        let count = (max_messages.max(1) as usize).min(state.pending.len());
        let records: Vec<QueueRecord> = state.pending.drain(..count).collect();
        state.in_flight.extend(records.iter().cloned());
        Ok(records)
    }

    async fn done(&self, receipt_handle: &str) -> InfraResult<()> {
        self.state()
            .in_flight
            .retain(|record| record.receipt_handle != receipt_handle);
        Ok(())
    }
}
