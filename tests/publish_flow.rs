//! 集計からQiitaへの公開までの一連の流れ
//!
//! 外部サービスをすべてメモリ上の実装に差し替え、
//! 集計 → キュー処理 → 公開ワークフロー（作成、2回目は更新）を通しで検証します。

use qiita_portfolio::app::consumer::poll_queue;
use qiita_portfolio::app::context::AppContext;
use qiita_portfolio::app::publish::run_publish_workflow;
use qiita_portfolio::app::summarize::{run_contribution_summary, ARTICLE_NAME};
use qiita_portfolio::domain::article::{get_publish_status, seed_template};
use qiita_portfolio::domain::item::{Item, Tag};
use qiita_portfolio::infra::api::qiita::MockBlogClient;
use qiita_portfolio::infra::queue::MemoryJobQueue;
use qiita_portfolio::infra::settings::Settings;
use qiita_portfolio::infra::sfn::RecordingOrchestrator;
use qiita_portfolio::infra::storage::MemoryArticleStore;
use qiita_portfolio::infra::template::{TemplateRenderer, PORTFOLIO_TEMPLATE};
use serde_json::{json, Value};
use std::sync::Arc;

struct Flow {
    ctx: AppContext,
    store: Arc<MemoryArticleStore>,
    queue: Arc<MemoryJobQueue>,
    orchestrator: Arc<RecordingOrchestrator>,
    blog: Arc<MockBlogClient>,
}

fn settings() -> Settings {
    Settings::from_lookup(|name| {
        let value = match name {
            "QIITA_API_TOKEN" => "token",
            "ARTICLE_TABLE_NAME" => "qiita-publish-article",
            "UPDATE_TEMPLATE_VARIABLES_QUEUE_NAME" => "update-template-variables",
            "PUBLISHER_STATEMACHINE_NAME" => "qiita-publisher",
            "AWS_ACCOUNT_ID" => "123456789012",
            "AWS_REGION" => "ap-northeast-1",
            "QIITA_PAGE_SIZE" => "2",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

fn item(id: &str, likes: u64, tags: &[&str]) -> Item {
    Item {
        id: id.to_string(),
        title: format!("記事{}", id),
        url: format!("https://qiita.com/user/items/{}", id),
        likes_count: Some(likes),
        tags: tags.iter().map(|t| Tag::new(*t)).collect(),
    }
}

fn flow(items: Vec<Item>) -> Flow {
    let store = Arc::new(MemoryArticleStore::new());
    let queue = Arc::new(MemoryJobQueue::new());
    let orchestrator = Arc::new(RecordingOrchestrator::new());
    let blog = Arc::new(MockBlogClient::with_items(items));
    let ctx = AppContext::new(
        settings(),
        store.clone(),
        queue.clone(),
        orchestrator.clone(),
        blog.clone(),
        TemplateRenderer::new().unwrap(),
    );
    Flow {
        ctx,
        store,
        queue,
        orchestrator,
        blog,
    }
}

#[tokio::test]
async fn test_summary_to_publish_then_update() {
    let flow = flow(vec![
        item("1", 10, &["Rust", "AWS"]),
        item("2", 3, &["Rust"]),
        item("3", 7, &["Python"]),
    ]);
    seed_template(
        flow.store.as_ref(),
        ARTICLE_NAME,
        PORTFOLIO_TEMPLATE,
        vec![Tag::new("Qiita")],
    )
    .await
    .unwrap();

    // 集計: page_size=2 なので2ページに分かれる
    let variables = run_contribution_summary(&flow.ctx).await.unwrap();
    assert_eq!(flow.blog.requested_pages(), vec![1, 2]);
    assert_eq!(variables.tags_count[0].name, "Rust");
    assert_eq!(variables.items[0].name, "記事1");

    // キュー処理: テンプレート変数の保存とワークフローの開始
    let updated = poll_queue(&flow.ctx, 10).await.unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(flow.queue.pending_len(), 0);
    assert_eq!(flow.queue.in_flight_len(), 0);
    let started = flow.orchestrator.started();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].0, "qiita-publisher");
    assert_eq!(
        serde_json::from_str::<Value>(&started[0].1).unwrap(),
        json!({"article": ARTICLE_NAME})
    );

    // 1回目の公開: 記事を作成する
    let created = run_publish_workflow(&flow.ctx, ARTICLE_NAME).await.unwrap();
    let item_id = created
        .get("item_id")
        .and_then(Value::as_str)
        .unwrap()
        .to_string();
    let drafts = flow.blog.created_drafts();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, ARTICLE_NAME);
    assert_eq!(drafts[0].tags, vec![Tag::new("Qiita")]);
    assert!(drafts[0].body.contains("| Rust | 2 |"));
    assert!(drafts[0].body.contains("[記事1](https://qiita.com/user/items/1)"));

    let status = get_publish_status(flow.store.as_ref(), ARTICLE_NAME)
        .await
        .unwrap();
    assert!(status.is_published);
    assert_eq!(status.item_id.as_deref(), Some(item_id.as_str()));

    // 2回目: 再集計後は既存記事の本文だけを更新する
    run_contribution_summary(&flow.ctx).await.unwrap();
    poll_queue(&flow.ctx, 10).await.unwrap();
    let republished = run_publish_workflow(&flow.ctx, ARTICLE_NAME).await.unwrap();

    assert_eq!(flow.blog.created_drafts().len(), 1, "記事は1件だけ作成される");
    let (updated_id, draft) = flow.blog.last_update().unwrap();
    assert_eq!(updated_id, item_id);
    assert_eq!(draft.title, ARTICLE_NAME);
    assert_eq!(republished.get("item_id"), Some(&json!(item_id)));
    println!("✅ 集計から公開・更新までの一連の流れ成功");
}

#[tokio::test]
async fn test_publish_without_seed_fails() {
    let flow = flow(vec![item("1", 1, &["Rust"])]);

    run_contribution_summary(&flow.ctx).await.unwrap();
    poll_queue(&flow.ctx, 10).await.unwrap();
    let result = run_publish_workflow(&flow.ctx, ARTICLE_NAME).await;

    assert!(result.is_err(), "テンプレート名が未登録なら公開できない");
    assert!(flow.blog.created_drafts().is_empty());
}
