//! 型定義モジュール
//!
//! アプリケーション全体で使用される共通的な型定義を管理します。
//! - 設定エラー: 環境変数・設定値の検証
//! - インフラエラー: AWS・HTTP・シリアライゼーションなど外部との境界
//! - ドメインエラー: 記事の公開ワークフローで発生するエラー

pub mod config;
pub mod error;
pub mod infra;

// 便利な再エクスポート
pub use config::{ConfigError, ConfigResult};
pub use error::{QpError, QpResult};
pub use infra::{InfraError, InfraResult};
