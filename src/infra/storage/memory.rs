use crate::domain::article::{ArticleStore, PublishStatus, TemplateRecord};
use crate::types::InfraResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// メモリ上で記事レコードを保持するストア
///
/// DynamoDBと同じく、`template_variables` の更新は他の属性を保持したまま行う。
#[derive(Default)]
pub struct MemoryArticleStore {
    templates: Mutex<HashMap<String, TemplateRecord>>,
    statuses: Mutex<HashMap<String, PublishStatus>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn templates(&self) -> MutexGuard<'_, HashMap<String, TemplateRecord>> {
        self.templates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn statuses(&self) -> MutexGuard<'_, HashMap<String, PublishStatus>> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn get_template(&self, article: &str) -> InfraResult<Option<TemplateRecord>> {
        Ok(self.templates().get(article).cloned())
    }

    async fn put_template(&self, record: &TemplateRecord) -> InfraResult<()> {
        self.templates()
            .insert(record.article.clone(), record.clone());
        Ok(())
    }

    async fn update_template_variables(
        &self,
        article: &str,
        template_variables: &Map<String, Value>,
        last_updated: i64,
    ) -> InfraResult<TemplateRecord> {
        let mut templates = self.templates();
        let record = templates
            .entry(article.to_string())
            .or_insert_with(|| TemplateRecord::new(article));
        record.template_variables = template_variables.clone();
        record.last_updated = Some(last_updated);
        Ok(record.clone())
    }

    async fn get_publish_status(&self, article: &str) -> InfraResult<Option<PublishStatus>> {
        Ok(self.statuses().get(article).cloned())
    }

    async fn put_publish_status(&self, article: &str, status: &PublishStatus) -> InfraResult<()> {
        self.statuses().insert(article.to_string(), status.clone());
        Ok(())
    }
}
