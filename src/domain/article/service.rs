use super::model::{PublishStatus, RenderConfig, TemplateRecord};
use super::repository::ArticleStore;
use crate::domain::item::Tag;
use crate::types::{QpError, QpResult};
use serde_json::{Map, Value};
use tracing::{error, info};

/// テンプレート変数を記事レコードへ書き込み、更新後のレコードを返す
///
/// `template_variables` は丸ごと上書きされるため、同じメッセージを何度処理しても結果は変わらない。
/// 数値はストア側で10進数として保存される。
pub async fn put_article_template_variables(
    store: &dyn ArticleStore,
    article: &str,
    template_variables: &Map<String, Value>,
) -> QpResult<TemplateRecord> {
    let now = chrono::Utc::now().timestamp();
    let record = store
        .update_template_variables(article, template_variables, now)
        .await?;
    info!(article, last_updated = now, "テンプレート変数を更新しました");
    Ok(record)
}

/// 記事のレンダリング設定を取得する
pub async fn find_render_config_by_article(
    store: &dyn ArticleStore,
    article: &str,
) -> QpResult<RenderConfig> {
    info!(article, "レンダリング設定を検索");
    match store.get_template(article).await? {
        Some(record) => RenderConfig::try_from(record),
        None => {
            error!(article, "レンダリング設定が見つかりません");
            Err(QpError::not_found(format!(
                "レンダリング設定: article = {}",
                article
            )))
        }
    }
}

/// 記事の公開状態を取得する。レコードがなければ未公開として扱う
pub async fn get_publish_status(
    store: &dyn ArticleStore,
    article: &str,
) -> QpResult<PublishStatus> {
    match store.get_publish_status(article).await? {
        Some(status) => Ok(status),
        None => {
            info!(article, "公開状態が未登録のため未公開として扱う");
            Ok(PublishStatus::unpublished())
        }
    }
}

/// 記事を公開済みとして記録する
///
/// 全置換の書き込みなので、Step Functionsによる再試行で同じ内容を書いても問題ない。
pub async fn put_published_status(
    store: &dyn ArticleStore,
    article: &str,
    item_id: &str,
) -> QpResult<()> {
    info!(article, item_id, "公開状態を記録");
    store
        .put_publish_status(article, &PublishStatus::published(item_id))
        .await?;
    Ok(())
}

/// 初回の集計より前にレンダリング設定を登録する
///
/// 既存のテンプレート変数は引き継ぐ。
pub async fn seed_template(
    store: &dyn ArticleStore,
    article: &str,
    template_name: &str,
    tags: Vec<Tag>,
) -> QpResult<TemplateRecord> {
    let mut record = store
        .get_template(article)
        .await?
        .unwrap_or_else(|| TemplateRecord::new(article));
    record.template_name = Some(template_name.to_string());
    record.tags = tags;
    store.put_template(&record).await?;
    info!(article, template_name, "レンダリング設定を登録しました");
    Ok(record)
}
