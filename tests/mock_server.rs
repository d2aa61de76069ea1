//! Qiita API モックサーバー
//!
//! httpmockでQiita API v2をモックし、外部通信を遮断した状態で
//! `QiitaClient` のリクエスト組み立てとレスポンス解釈を検証します。

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use qiita_portfolio::domain::item::{list_own_items, update_item_body, ItemDraft, Tag};
use qiita_portfolio::infra::api::qiita::{BlogClient, QiitaClient};
use qiita_portfolio::types::QpError;
use serde_json::{json, Value};

const TOKEN: &str = "test-token";

/// Qiita APIのモックサーバー
struct QiitaMockServer {
    server: MockServer,
}

impl QiitaMockServer {
    async fn start() -> Self {
        Self {
            server: MockServer::start_async().await,
        }
    }

    fn client(&self) -> QiitaClient {
        QiitaClient::new(self.server.base_url(), TOKEN)
    }

    fn list_url(&self, page: u32, per_page: u32) -> String {
        self.server.url(format!(
            "/api/v2/authenticated_user/items?page={}&per_page={}",
            page, per_page
        ))
    }

    /// Qiitaと同じ形式のLinkヘッダ
    fn link_header(&self, page: u32, last: u32, per_page: u32) -> String {
        let mut links = vec![format!("<{}>; rel=\"first\"", self.list_url(1, per_page))];
        if page > 1 {
            links.push(format!("<{}>; rel=\"prev\"", self.list_url(page - 1, per_page)));
        }
        if page < last {
            links.push(format!("<{}>; rel=\"next\"", self.list_url(page + 1, per_page)));
        }
        links.push(format!("<{}>; rel=\"last\"", self.list_url(last, per_page)));
        links.join(", ")
    }

    /// 投稿一覧の1ページをモック
    async fn mock_list_page(
        &self,
        page: u32,
        last: u32,
        per_page: u32,
        items: Value,
    ) -> httpmock::Mock<'_> {
        let link = self.link_header(page, last, per_page);
        self.server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/authenticated_user/items")
                    .query_param("page", page.to_string())
                    .query_param("per_page", per_page.to_string())
                    .header("authorization", format!("Bearer {}", TOKEN));
                then.status(200)
                    .header("content-type", "application/json")
                    .header("link", link)
                    .json_body(items);
            })
            .await
    }

    async fn mock_list_error(&self, page: u32) -> httpmock::Mock<'_> {
        self.server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/authenticated_user/items")
                    .query_param("page", page.to_string());
                then.status(500).body("Internal Server Error");
            })
            .await
    }

    async fn mock_get_item(&self, id: &str, body: Value) -> httpmock::Mock<'_> {
        let path = format!("/api/v2/items/{}", id);
        self.server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(body);
            })
            .await
    }
}

fn item_json(id: &str, likes: u64, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "title": format!("記事{}", id),
        "url": format!("https://qiita.com/user/items/{}", id),
        "likes_count": likes,
        "tags": tags.iter().map(|t| json!({"name": t, "versions": []})).collect::<Vec<_>>(),
        "body": "本文は集計に使わない",
    })
}

#[tokio::test]
async fn test_list_single_page() {
    let mock = QiitaMockServer::start().await;
    let page = mock
        .mock_list_page(1, 1, 100, json!([item_json("a", 3, &["Rust"])]))
        .await;

    let items = list_own_items(&mock.client(), 100).await.unwrap();

    page.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].likes(), 3);
    assert_eq!(items[0].tags, vec![Tag::new("Rust")]);
    println!("✅ 1ページのみの投稿一覧取得成功");
}

#[tokio::test]
async fn test_list_follows_last_link() {
    let mock = QiitaMockServer::start().await;
    let first = mock
        .mock_list_page(1, 3, 2, json!([item_json("1", 0, &[]), item_json("2", 0, &[])]))
        .await;
    let second = mock
        .mock_list_page(2, 3, 2, json!([item_json("3", 0, &[]), item_json("4", 0, &[])]))
        .await;
    let third = mock
        .mock_list_page(3, 3, 2, json!([item_json("5", 0, &[])]))
        .await;

    let items = list_own_items(&mock.client(), 2).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    third.assert_async().await;
    let ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    println!("✅ 複数ページの投稿一覧取得成功");
}

#[tokio::test]
async fn test_list_failure_discards_partial_results() {
    let mock = QiitaMockServer::start().await;
    mock.mock_list_page(1, 2, 2, json!([item_json("1", 0, &[])]))
        .await;
    mock.mock_list_error(2).await;

    let result = list_own_items(&mock.client(), 2).await;

    match result {
        Err(QpError::Api { status, .. }) => assert_eq!(status, 500),
        other => panic!("Apiエラーが返るべき: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_without_link_header_is_single_page() {
    let mock = QiitaMockServer::start().await;
    let page = mock
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/authenticated_user/items");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([item_json("a", 1, &[])]));
        })
        .await;

    let items = list_own_items(&mock.client(), 100).await.unwrap();

    page.assert_hits_async(1).await;
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_list_with_unparsable_last_link() {
    let mock = QiitaMockServer::start().await;
    let last = mock.server.url("/api/v2/authenticated_user/items?page=&per_page=2");
    let link = format!(
        "<{}>; rel=\"first\", <{}>; rel=\"last\"",
        mock.list_url(1, 2),
        last
    );
    mock.server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/authenticated_user/items");
            then.status(200)
                .header("content-type", "application/json")
                .header("link", link)
                .json_body(json!([item_json("a", 1, &[])]));
        })
        .await;

    let result = list_own_items(&mock.client(), 2).await;

    match result {
        Err(QpError::InvalidPaginationLink { link }) => assert_eq!(link, last),
        other => panic!("InvalidPaginationLinkが返るべき: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_item_posts_draft() {
    let mock = QiitaMockServer::start().await;
    let create = mock
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v2/items")
                .header("authorization", format!("Bearer {}", TOKEN))
                .json_body_partial(
                    json!({"title": "ポートフォリオ", "tags": [{"name": "Qiita"}]}).to_string(),
                );
            then.status(201)
                .header("content-type", "application/json")
                .json_body(item_json("new", 0, &["Qiita"]));
        })
        .await;
    let draft = ItemDraft {
        title: "ポートフォリオ".to_string(),
        body: "# 本文".to_string(),
        tags: vec![Tag::new("Qiita")],
    };

    let item = mock.client().create_item(&draft).await.unwrap();

    create.assert_async().await;
    assert_eq!(item.id, "new");
    println!("✅ 記事作成成功");
}

#[tokio::test]
async fn test_create_item_rejected() {
    let mock = QiitaMockServer::start().await;
    mock.server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v2/items");
            then.status(403).body(r#"{"message":"Forbidden","type":"forbidden"}"#);
        })
        .await;
    let draft = ItemDraft {
        title: "t".to_string(),
        body: "b".to_string(),
        tags: Vec::new(),
    };

    let result = mock.client().create_item(&draft).await;

    assert!(matches!(result, Err(QpError::ItemCreate { .. })));
}

#[tokio::test]
async fn test_update_body_keeps_title_and_tags() {
    let mock = QiitaMockServer::start().await;
    mock.mock_get_item("X", item_json("X", 9, &["Portfolio"]))
        .await;
    let update = mock
        .server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/v2/items/X")
                .json_body(json!({
                    "title": "記事X",
                    "body": "新しい本文",
                    "tags": [{"name": "Portfolio", "versions": []}],
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(item_json("X", 9, &["Portfolio"]));
        })
        .await;

    let item = update_item_body(&mock.client(), "X", "新しい本文".to_string())
        .await
        .unwrap();

    update.assert_async().await;
    assert_eq!(item.id, "X");
    println!("✅ 記事本文の更新成功");
}

#[tokio::test]
async fn test_get_missing_item_is_not_found() {
    let mock = QiitaMockServer::start().await;
    mock.server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/items/missing");
            then.status(404).body(r#"{"message":"Not found","type":"not_found"}"#);
        })
        .await;

    let result = mock.client().get_item("missing").await;

    assert!(matches!(result, Err(QpError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_rejected() {
    let mock = QiitaMockServer::start().await;
    mock.mock_get_item("X", item_json("X", 0, &[])).await;
    mock.server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/v2/items/X");
            then.status(422).body("Unprocessable Entity");
        })
        .await;

    let result = update_item_body(&mock.client(), "X", "本文".to_string()).await;

    assert!(matches!(result, Err(QpError::ItemUpdate { .. })));
}
