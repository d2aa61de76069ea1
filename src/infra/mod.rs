//! インフラ層
//!
//! 外部サービス（Qiita・DynamoDB・SQS・Step Functions）との境界と、
//! 設定・ログ・テンプレートなどの基盤を提供します。

pub mod api;
pub mod loader;
pub mod parser;
pub mod queue;
pub mod settings;
pub mod sfn;
pub mod storage;
pub mod telemetry;
pub mod template;
