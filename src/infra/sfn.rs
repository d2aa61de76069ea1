use crate::types::{InfraError, InfraResult};
use async_trait::async_trait;
use aws_sdk_sfn::Client;
use std::sync::{Mutex, PoisonError};

/// ステートマシンのARNを組み立てる
pub fn state_machine_arn(region: &str, account_id: &str, name: &str) -> String {
    format!("arn:aws:states:{}:{}:stateMachine:{}", region, account_id, name)
}

/// 開始したワークフロー実行の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub execution_arn: String,
}

/// ワークフローエンジンの抽象化トレイト
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// 名前で指定したステートマシンをJSON入力で開始する
    async fn start_execution(&self, name: &str, input: &str) -> InfraResult<Execution>;
}

/// AWS Step Functionsを使うワークフローエンジン
pub struct SfnOrchestrator {
    client: Client,
    region: String,
    account_id: String,
}

impl SfnOrchestrator {
    pub fn new<R: Into<String>, A: Into<String>>(client: Client, region: R, account_id: A) -> Self {
        Self {
            client,
            region: region.into(),
            account_id: account_id.into(),
        }
    }
}

#[async_trait]
impl Orchestrator for SfnOrchestrator {
    async fn start_execution(&self, name: &str, input: &str) -> InfraResult<Execution> {
        let arn = state_machine_arn(&self.region, &self.account_id, name);
        let output = self
            .client
            .start_execution()
            .state_machine_arn(&arn)
            .input(input)
            .send()
            .await
            .map_err(|e| InfraError::step_functions(format!("start_execution {}", arn), e))?;
        Ok(Execution {
            execution_arn: output.execution_arn().to_string(),
        })
    }
}

/// 開始要求を記録するだけのワークフローエンジン（テスト用）
#[derive(Default)]
pub struct RecordingOrchestrator {
    started: Mutex<Vec<(String, String)>>,
}

impl RecordingOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始されたステートマシン名と入力の履歴
    pub fn started(&self) -> Vec<(String, String)> {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Orchestrator for RecordingOrchestrator {
    async fn start_execution(&self, name: &str, input: &str) -> InfraResult<Execution> {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        started.push((name.to_string(), input.to_string()));
        Ok(Execution {
            execution_arn: format!("{}:execution-{}", name, started.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_arn() {
        assert_eq!(
            state_machine_arn("ap-northeast-1", "123456789012", "publisher"),
            "arn:aws:states:ap-northeast-1:123456789012:stateMachine:publisher"
        );
    }

    #[tokio::test]
    async fn test_recording_orchestrator() {
        let orchestrator = RecordingOrchestrator::new();

        let first = orchestrator.start_execution("publisher", "{}").await.unwrap();
        let second = orchestrator.start_execution("publisher", "{}").await.unwrap();

        assert_ne!(first, second, "重複した開始も別の実行になる");
        assert_eq!(orchestrator.started().len(), 2);
    }
}
