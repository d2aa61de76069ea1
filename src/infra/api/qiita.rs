use crate::domain::item::{Item, ItemDraft, ItemPage};
use crate::infra::parser::{parse_link_header, PageLinks};
use crate::types::{InfraError, QpError, QpResult};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

/// Qiita API v2の抽象化トレイト
///
/// 実際のHTTP通信とモック実装の両方を統一的に扱えるようにするためのインターフェースです。
#[async_trait]
pub trait BlogClient: Send + Sync {
    /// 記事を1件取得する。存在しなければ `NotFound`
    async fn get_item(&self, item_id: &str) -> QpResult<Item>;

    /// 記事を作成する。拒否された場合は `ItemCreate`
    async fn create_item(&self, draft: &ItemDraft) -> QpResult<Item>;

    /// 記事を更新する。拒否された場合は `ItemUpdate`
    async fn update_item(&self, item_id: &str, draft: &ItemDraft) -> QpResult<Item>;

    /// 認証ユーザーの投稿一覧を1ページ取得する
    async fn list_items_page(&self, page: u32, per_page: u32) -> QpResult<ItemPage>;
}

/// `reqwest` を使用した本番用のQiitaクライアント実装
pub struct QiitaClient {
    client: Client,
    base_url: String,
    token: String,
}

impl QiitaClient {
    /// 新しいQiitaクライアントを作成
    pub fn new<B: Into<String>, T: Into<String>>(base_url: B, token: T) -> Self {
        info!("QiitaClientを初期化しました");
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v2{}", self.base_url.trim_end_matches('/'), path)
    }

    /// 失敗したレスポンスからステータスと本文を取り出す
    async fn failure(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }

    async fn parse_item(response: Response, operation: &str) -> QpResult<Item> {
        response
            .json::<Item>()
            .await
            .map_err(|e| InfraError::http(operation, e).into())
    }
}

#[async_trait]
impl BlogClient for QiitaClient {
    async fn get_item(&self, item_id: &str) -> QpResult<Item> {
        let response = self
            .client
            .get(self.endpoint(&format!("/items/{}", item_id)))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| InfraError::http("記事の取得", e))?;

        if !response.status().is_success() {
            let (status, _) = Self::failure(response).await;
            return Err(QpError::not_found(format!(
                "Qiitaの記事: item id = {} (status={})",
                item_id, status
            )));
        }
        Self::parse_item(response, "記事の取得").await
    }

    async fn create_item(&self, draft: &ItemDraft) -> QpResult<Item> {
        let response = self
            .client
            .post(self.endpoint("/items"))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await
            .map_err(|e| InfraError::http("記事の作成", e))?;

        if !response.status().is_success() {
            let (status, body) = Self::failure(response).await;
            error!(status, body = %body, "記事の作成が拒否されました");
            return Err(QpError::item_create(format!("status={} {}", status, body)));
        }
        let item = Self::parse_item(response, "記事の作成").await?;
        info!(item_id = %item.id, "記事を作成しました");
        Ok(item)
    }

    async fn update_item(&self, item_id: &str, draft: &ItemDraft) -> QpResult<Item> {
        let response = self
            .client
            .patch(self.endpoint(&format!("/items/{}", item_id)))
            .bearer_auth(&self.token)
            .json(draft)
            .send()
            .await
            .map_err(|e| InfraError::http("記事の更新", e))?;

        if !response.status().is_success() {
            let (status, body) = Self::failure(response).await;
            error!(item_id, status, body = %body, "記事の更新が拒否されました");
            return Err(QpError::item_update(format!("status={} {}", status, body)));
        }
        let item = Self::parse_item(response, "記事の更新").await?;
        info!(item_id = %item.id, "記事を更新しました");
        Ok(item)
    }

    async fn list_items_page(&self, page: u32, per_page: u32) -> QpResult<ItemPage> {
        let response = self
            .client
            .get(self.endpoint("/authenticated_user/items"))
            .bearer_auth(&self.token)
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await
            .map_err(|e| InfraError::http("投稿一覧の取得", e))?;

        if !response.status().is_success() {
            let (status, body) = Self::failure(response).await;
            return Err(QpError::api(status, body));
        }

        let links = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|value| value.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();
        let items = response
            .json::<Vec<Item>>()
            .await
            .map_err(|e| InfraError::http("投稿一覧の解析", e))?;

        Ok(ItemPage { items, links })
    }
}

/// テスト用のモッククライアント
///
/// 記事をメモリ上に保持し、Qiitaと同じ形式のページネーションリンクを返します。
/// 呼び出し履歴を記録するので、取得したページや更新内容を検証できます。
#[derive(Default)]
pub struct MockBlogClient {
    items: Mutex<Vec<Item>>,
    requested_pages: Mutex<Vec<u32>>,
    updates: Mutex<Vec<(String, ItemDraft)>>,
    creates: Mutex<Vec<ItemDraft>>,
    fail_on_page: Option<u32>,
    reject_writes: bool,
}

const MOCK_LIST_URL: &str = "https://qiita.com/api/v2/authenticated_user/items";

impl MockBlogClient {
    /// 指定した記事を持つモッククライアントを作成
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    /// 指定したページの取得をエラーにする
    pub fn fail_on_page(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// 作成・更新をすべて拒否する
    pub fn reject_writes(mut self) -> Self {
        self.reject_writes = true;
        self
    }

    /// 取得されたページ番号の履歴
    pub fn requested_pages(&self) -> Vec<u32> {
        lock(&self.requested_pages).clone()
    }

    /// 最後に呼ばれた更新の記事IDとパラメータ
    pub fn last_update(&self) -> Option<(String, ItemDraft)> {
        lock(&self.updates).last().cloned()
    }

    /// 作成APIに渡されたパラメータの履歴
    pub fn created_drafts(&self) -> Vec<ItemDraft> {
        lock(&self.creates).clone()
    }

    fn page_link(page: u32, per_page: u32) -> String {
        format!("{}?page={}&per_page={}", MOCK_LIST_URL, page, per_page)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl BlogClient for MockBlogClient {
    async fn get_item(&self, item_id: &str) -> QpResult<Item> {
        lock(&self.items)
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| QpError::not_found(format!("Qiitaの記事: item id = {}", item_id)))
    }

    async fn create_item(&self, draft: &ItemDraft) -> QpResult<Item> {
        lock(&self.creates).push(draft.clone());
        if self.reject_writes {
            return Err(QpError::item_create("モックが作成を拒否しました"));
        }

        let mut items = lock(&self.items);
        let id = format!("mock-item-{}", items.len() + 1);
        let item = Item {
            id: id.clone(),
            title: draft.title.clone(),
            url: format!("https://qiita.com/mock/items/{}", id),
            likes_count: Some(0),
            tags: draft.tags.clone(),
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, item_id: &str, draft: &ItemDraft) -> QpResult<Item> {
        lock(&self.updates).push((item_id.to_string(), draft.clone()));
        if self.reject_writes {
            return Err(QpError::item_update("モックが更新を拒否しました"));
        }

        let mut items = lock(&self.items);
        let item = items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or_else(|| QpError::item_update(format!("item id = {} は存在しません", item_id)))?;
        item.title = draft.title.clone();
        item.tags = draft.tags.clone();
        Ok(item.clone())
    }

    async fn list_items_page(&self, page: u32, per_page: u32) -> QpResult<ItemPage> {
        lock(&self.requested_pages).push(page);
        if self.fail_on_page == Some(page) {
            return Err(QpError::api(500, format!("モックHTTPエラー: page={}", page)));
        }

        let items = lock(&self.items);
        let per_page = per_page.max(1) as usize;
        let last_page = items.len().div_ceil(per_page).max(1) as u32;
        let start = page.saturating_sub(1) as usize * per_page;
        let page_items = items.iter().skip(start).take(per_page).cloned().collect();

        Ok(ItemPage {
            items: page_items,
            links: PageLinks {
                first: Some(Self::page_link(1, per_page as u32)),
                prev: None,
                next: None,
                last: Some(Self::page_link(last_page, per_page as u32)),
            },
        })
    }
}
