//! ドメイン層
//!
//! - article: 記事レコード（レンダリング設定・公開状態）
//! - item: Qiitaの投稿記事とページネーション
//! - summary: 投稿統計の集計
//! - job: テンプレート変数キューのメッセージ

pub mod article;
pub mod item;
pub mod job;
pub mod summary;
