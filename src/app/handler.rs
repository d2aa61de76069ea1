use crate::types::QpResult;
use serde::Serialize;
use std::future::Future;
use tracing::{error, info};

/// ハンドラをログ出力で包む
///
/// 入力をログに出してから実行し、失敗した場合はエラーをログに出してそのまま返す。
/// 復旧や再試行は行わない。
pub async fn with_logging<I, O, F, Fut>(handler: &str, input: I, run: F) -> QpResult<O>
where
    I: Serialize,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = QpResult<O>>,
{
    match serde_json::to_string(&input) {
        Ok(event) => info!(handler, event = %event, "ハンドラを開始"),
        Err(e) => info!(handler, error = %e, "ハンドラを開始（入力をシリアライズできません）"),
    }

    let result = run(input).await;
    if let Err(e) = &result {
        error!(handler, error = %e, detail = ?e, "ハンドラが失敗しました");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QpError;

    #[tokio::test]
    async fn test_passes_output_through() {
        let result = with_logging("double", 21, |n| async move { Ok(n * 2) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_reraises_error_unchanged() {
        let result: QpResult<()> = with_logging("fail", "input", |_| async {
            Err(QpError::not_found("テスト"))
        })
        .await;

        match result {
            Err(QpError::NotFound { what }) => assert_eq!(what, "テスト"),
            other => panic!("NotFoundが返るべき: {:?}", other),
        }
    }
}
