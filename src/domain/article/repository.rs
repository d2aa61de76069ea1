use super::model::{PublishStatus, TemplateRecord};
use crate::types::InfraResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// 記事レコードの永続化を抽象化するトレイト
///
/// レコードは `(article, parameter_type)` の複合キーで一意に識別される。
/// 本番ではDynamoDB、テストではメモリ上の実装を注入する。
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// `template` レコードを取得する
    async fn get_template(&self, article: &str) -> InfraResult<Option<TemplateRecord>>;

    /// `template` レコードを丸ごと書き込む
    async fn put_template(&self, record: &TemplateRecord) -> InfraResult<()>;

    /// `template_variables` と `last_updated` だけを上書きし、更新後のレコードを返す
    ///
    /// レコードがなければ作成する。他の属性は保持される。
    async fn update_template_variables(
        &self,
        article: &str,
        template_variables: &Map<String, Value>,
        last_updated: i64,
    ) -> InfraResult<TemplateRecord>;

    /// `publish_status` レコードを取得する
    async fn get_publish_status(&self, article: &str) -> InfraResult<Option<PublishStatus>>;

    /// `publish_status` レコードを丸ごと書き込む
    async fn put_publish_status(&self, article: &str, status: &PublishStatus) -> InfraResult<()>;
}
