use crate::infra::settings::LogFormat;
use crate::types::{InfraError, InfraResult};
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

/// グローバルなtracingサブスクライバを設定する
///
/// `level` は `LOG_LEVEL` の値（`DEBUG` なども可）で、このクレートのログにだけ適用する。
/// 依存クレートは `info` 以上。`RUST_LOG` が設定されていればそちらを優先する。
/// ログは標準エラー出力へ書き出し、標準出力はハンドラの結果に使う。
pub fn init(level: &str, format: LogFormat) -> InfraResult<()> {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(default_directives(level)),
    }
    .map_err(|e| InfraError::telemetry(format!("ログレベルが不正です: {}", e)))?;

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InfraError::telemetry(format!("サブスクライバの設定に失敗: {}", e)))
}

/// `LOG_LEVEL` からフィルタのディレクティブを組み立てる
fn default_directives(level: &str) -> String {
    format!(
        "{}={},info",
        env!("CARGO_CRATE_NAME"),
        level.trim().to_ascii_lowercase()
    )
}
