use crate::app::context::AppContext;
use crate::domain::item::list_own_items;
use crate::domain::job::enqueue_template_variables;
use crate::domain::summary::{summarize_items, TemplateVariables};
use crate::types::{QpError, QpResult};
use tracing::info;

/// 投稿記事を特定するための名前
pub const ARTICLE_NAME: &str = "Qiita Contributions Portfolio (Auto Generated)";
/// タグ出現頻度の上位N件
pub const MAX_FREQUENT_TAGS: usize = 10;
/// いいね数の上位N件
pub const MAX_LIKED_ITEMS: usize = 5;

/// 投稿記事の統計を集計し、テンプレート変数をキューへ送る
///
/// 投稿一覧の取得がどのページで失敗しても集計全体を中止する。
pub async fn run_contribution_summary(ctx: &AppContext) -> QpResult<TemplateVariables> {
    let items = list_own_items(ctx.blog.as_ref(), ctx.settings.qiita_page_size)
        .await
        .map_err(QpError::aggregation)?;

    let variables = summarize_items(&items, MAX_FREQUENT_TAGS, MAX_LIKED_ITEMS);
    info!(
        items = items.len(),
        tags = variables.tags_count.len(),
        liked = variables.items.len(),
        "投稿記事を集計しました"
    );

    enqueue_template_variables(ctx.queue.as_ref(), ARTICLE_NAME, &variables).await?;
    Ok(variables)
}
