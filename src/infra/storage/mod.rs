//! 記事ストアの実装
//!
//! - dynamodb: 本番用。`(article, parameter_type)` をキーとするテーブル
//! - memory: テスト・ローカル実行用

pub mod dynamodb;
pub mod memory;

pub use dynamodb::DynamoArticleStore;
pub use memory::MemoryArticleStore;
