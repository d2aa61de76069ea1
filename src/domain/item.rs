use crate::infra::api::qiita::BlogClient;
use crate::infra::parser::{parse_page_number, PageLinks};
use crate::types::QpResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Qiitaのタグ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

impl Tag {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }
}

/// Qiitaの投稿記事（集計と更新に必要なフィールドのみ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub likes_count: Option<u64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Item {
    /// いいね数。フィールドがなければ0とみなす
    pub fn likes(&self) -> u64 {
        self.likes_count.unwrap_or(0)
    }
}

/// 記事の作成・更新時に送るパラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub body: String,
    pub tags: Vec<Tag>,
}

/// 投稿一覧の1ページ分
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub links: PageLinks,
}

/// 認証ユーザーの投稿記事を全ページ分取得する
///
/// 1ページ目を取得し、`first` と `last` のリンクが同じならそれで終わり。
/// 異なる場合は `last` のpage番号まで2ページ目から順に取得して連結する。
/// どのページで失敗しても、それまでの結果は捨ててエラーを返す。
pub async fn list_own_items(client: &dyn BlogClient, per_page: u32) -> QpResult<Vec<Item>> {
    let first_page = client.list_items_page(1, per_page).await?;
    let mut items = first_page.items;

    if first_page.links.first == first_page.links.last {
        debug!(count = items.len(), "投稿一覧は1ページのみ");
        return Ok(items);
    }
    let Some(last_link) = first_page.links.last.as_deref() else {
        return Ok(items);
    };

    let last_page = parse_page_number(last_link)?;
    for page in 2..=last_page {
        let next = client.list_items_page(page, per_page).await?;
        items.extend(next.items);
    }

    info!(pages = last_page, count = items.len(), "投稿一覧を取得しました");
    Ok(items)
}

/// 既存記事の本文だけを差し替える
///
/// タイトルとタグは変更しない。Qiitaの更新APIは全項目を要求するため、
/// 現在の記事を取得してタイトルとタグを引き継ぐ。
pub async fn update_item_body(
    client: &dyn BlogClient,
    item_id: &str,
    body: String,
) -> QpResult<Item> {
    let current = client.get_item(item_id).await?;
    let draft = ItemDraft {
        title: current.title,
        body,
        tags: current.tags,
    };
    client.update_item(item_id, &draft).await
}
