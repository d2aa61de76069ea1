//! 単体テスト用のコンテキスト組み立て

use crate::app::context::AppContext;
use crate::domain::item::{Item, Tag};
use crate::infra::api::qiita::MockBlogClient;
use crate::infra::queue::MemoryJobQueue;
use crate::infra::settings::Settings;
use crate::infra::sfn::RecordingOrchestrator;
use crate::infra::storage::MemoryArticleStore;
use crate::infra::template::TemplateRenderer;
use std::sync::Arc;

pub struct TestParts {
    pub ctx: AppContext,
    pub store: Arc<MemoryArticleStore>,
    pub queue: Arc<MemoryJobQueue>,
    pub orchestrator: Arc<RecordingOrchestrator>,
    pub blog: Arc<MockBlogClient>,
}

pub fn test_settings() -> Settings {
    Settings::from_lookup(|name| {
        let value = match name {
            "QIITA_API_TOKEN" => "token",
            "ARTICLE_TABLE_NAME" => "qiita-publish-article-test",
            "UPDATE_TEMPLATE_VARIABLES_QUEUE_NAME" => "update-template-variables",
            "PUBLISHER_STATEMACHINE_NAME" => "publisher",
            "AWS_ACCOUNT_ID" => "123456789012",
            "AWS_REGION" => "ap-northeast-1",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("テスト用設定の組み立てに失敗")
}

pub fn context_with(blog: MockBlogClient) -> TestParts {
    let store = Arc::new(MemoryArticleStore::new());
    let queue = Arc::new(MemoryJobQueue::new());
    let orchestrator = Arc::new(RecordingOrchestrator::new());
    let blog = Arc::new(blog);
    let ctx = AppContext::new(
        test_settings(),
        store.clone(),
        queue.clone(),
        orchestrator.clone(),
        blog.clone(),
        TemplateRenderer::new().expect("組み込みテンプレートの登録に失敗"),
    );
    TestParts {
        ctx,
        store,
        queue,
        orchestrator,
        blog,
    }
}

pub fn item(id: &str, likes: Option<u64>, tags: &[&str]) -> Item {
    Item {
        id: id.to_string(),
        title: format!("記事{}", id),
        url: format!("https://qiita.com/user/items/{}", id),
        likes_count: likes,
        tags: tags.iter().map(|t| Tag::new(*t)).collect(),
    }
}
