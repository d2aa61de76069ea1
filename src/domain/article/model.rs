use crate::domain::item::Tag;
use crate::types::{QpError, QpResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 記事レコードの種類（ソートキー `parameter_type` の値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// レンダリング設定とテンプレート変数
    Template,
    /// Qiitaへの公開状態
    PublishStatus,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::PublishStatus => "publish_status",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `parameter_type = template` のレコード
///
/// キューの処理で `template_variables` と `last_updated` だけを更新するため、
/// レコードが先に存在しない場合は `template_name` が欠けていることがある。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub article: String,
    pub template_name: Option<String>,
    #[serde(default)]
    pub template_variables: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub last_updated: Option<i64>,
}

impl TemplateRecord {
    pub fn new<A: Into<String>>(article: A) -> Self {
        Self {
            article: article.into(),
            template_name: None,
            template_variables: Map::new(),
            tags: Vec::new(),
            last_updated: None,
        }
    }
}

/// 記事のレンダリングに使う設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub article: String,
    pub template_name: String,
    pub template_variables: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
}

impl TryFrom<TemplateRecord> for RenderConfig {
    type Error = QpError;

    fn try_from(record: TemplateRecord) -> QpResult<Self> {
        let Some(template_name) = record.template_name else {
            return Err(QpError::not_found(format!(
                "テンプレート名が未設定です: article = {}",
                record.article
            )));
        };
        Ok(Self {
            article: record.article,
            template_name,
            template_variables: record.template_variables,
            tags: record.tags,
            last_updated: record.last_updated,
        })
    }
}

/// Qiitaへの公開状態
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishStatus {
    pub is_published: bool,
    pub item_id: Option<String>,
}

impl PublishStatus {
    /// 公開済みの状態を作成
    pub fn published<I: Into<String>>(item_id: I) -> Self {
        Self {
            is_published: true,
            item_id: Some(item_id.into()),
        }
    }

    /// 未公開の状態を作成
    pub fn unpublished() -> Self {
        Self::default()
    }

    /// 更新対象の記事IDを持っているか
    pub fn updatable_item_id(&self) -> Option<&str> {
        if !self.is_published {
            return None;
        }
        self.item_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_type_strings() {
        assert_eq!(ParameterType::Template.as_str(), "template");
        assert_eq!(ParameterType::PublishStatus.to_string(), "publish_status");
        assert_eq!(
            serde_json::to_value(ParameterType::PublishStatus).unwrap(),
            "publish_status"
        );
    }

    #[test]
    fn test_render_config_requires_template_name() {
        let record = TemplateRecord::new("portfolio");
        assert!(matches!(
            RenderConfig::try_from(record),
            Err(QpError::NotFound { .. })
        ));

        let mut record = TemplateRecord::new("portfolio");
        record.template_name = Some("portfolio.md".to_string());
        let config = RenderConfig::try_from(record).unwrap();
        assert_eq!(config.template_name, "portfolio.md");
    }

    #[test]
    fn test_unpublished_status_serializes_null_item_id() {
        let value = serde_json::to_value(PublishStatus::unpublished()).unwrap();
        assert_eq!(value, serde_json::json!({"is_published": false, "item_id": null}));
    }

    #[test]
    fn test_updatable_item_id() {
        assert_eq!(PublishStatus::published("X").updatable_item_id(), Some("X"));
        assert_eq!(PublishStatus::unpublished().updatable_item_id(), None);
        assert_eq!(PublishStatus::published("").updatable_item_id(), None);
    }
}
