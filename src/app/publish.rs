//! 記事公開ワークフローのステップ
//!
//! 各ステップはStep Functionsから個別に呼ばれ、JSONの状態を受け取って新しい状態を返す。
//! 状態は次のように蓄積される:
//!
//! 1. `find_template_by_article`: `{article}` にレンダリング設定が加わる
//! 2. `get_item_exists`: `publish_status` が加わる
//! 3. `create_item` / `update_item`: `item_id` と `url` が加わる
//! 4. `update_publish_status`: 状態はそのまま
//!
//! `is_published` による分岐はステートマシン側の責務。ローカル実行用に
//! 同じ分岐を行う [`run_publish_workflow`] を用意している。

use crate::app::context::AppContext;
use crate::app::handler::with_logging;
use crate::domain::article::{
    find_render_config_by_article, get_publish_status, put_published_status, PublishStatus,
    RenderConfig,
};
use crate::domain::item::{update_item_body, Item, ItemDraft, Tag};
use crate::types::{QpError, QpResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// ワークフローの各ステップ間で受け渡される状態
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowState(Map<String, Value>);

impl WorkflowState {
    /// ワークフローの開始時の状態 `{article}`
    pub fn new(article: &str) -> Self {
        let mut map = Map::new();
        map.insert("article".to_string(), Value::String(article.to_string()));
        Self(map)
    }

    /// JSON文字列から状態を読み込む。オブジェクト以外はエラー
    pub fn from_json(raw: &str) -> QpResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| QpError::invalid_state(format!("JSONオブジェクトではありません: {}", e)))
    }

    /// ステップの入力として状態を検証しつつ取り出す
    pub fn extract<T: DeserializeOwned>(&self, step: Step) -> QpResult<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| QpError::invalid_state(format!("{}: {}", step, e)))
    }

    /// ステップの出力のフィールドを最上位へ加える
    pub fn merge<T: Serialize>(mut self, output: &T) -> QpResult<Self> {
        match to_value(output)? {
            Value::Object(fields) => {
                self.0.extend(fields);
                Ok(self)
            }
            other => Err(QpError::invalid_state(format!(
                "オブジェクト以外は統合できません: {}",
                other
            ))),
        }
    }

    /// ステップの出力を指定したキーに格納する
    pub fn insert<T: Serialize>(mut self, key: &str, output: &T) -> QpResult<Self> {
        self.0.insert(key.to_string(), to_value(output)?);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn to_value<T: Serialize>(output: &T) -> QpResult<Value> {
    serde_json::to_value(output)
        .map_err(|e| QpError::invalid_state(format!("出力をシリアライズできません: {}", e)))
}

/// `{article}` だけを必要とするステップの入力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    pub article: String,
}

/// `create_item` の入力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemInput {
    pub article: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub template_name: String,
    pub template_variables: Map<String, Value>,
}

/// `update_item` の入力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateItemInput {
    pub template_name: String,
    pub template_variables: Map<String, Value>,
    pub publish_status: PublishStatus,
}

/// 作成・更新したQiitaの記事
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedItem {
    pub item_id: String,
    pub url: String,
}

impl From<Item> for PublishedItem {
    fn from(item: Item) -> Self {
        Self {
            item_id: item.id,
            url: item.url,
        }
    }
}

/// `update_publish_status` の入力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishStatusInput {
    pub article: String,
    pub item_id: String,
}

/// ワークフローのステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FindTemplateByArticle,
    GetItemExists,
    CreateItem,
    UpdateItem,
    UpdatePublishStatus,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::FindTemplateByArticle,
        Step::GetItemExists,
        Step::CreateItem,
        Step::UpdateItem,
        Step::UpdatePublishStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FindTemplateByArticle => "find_template_by_article",
            Self::GetItemExists => "get_item_exists",
            Self::CreateItem => "create_item",
            Self::UpdateItem => "update_item",
            Self::UpdatePublishStatus => "update_publish_status",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Step::ALL.iter().map(Step::as_str).collect();
                format!("不明なステップです: {} (指定可能: {})", s, names.join(", "))
            })
    }
}

/// 記事のレンダリング設定を返す
pub async fn find_template_by_article(
    ctx: &AppContext,
    input: ArticleInput,
) -> QpResult<RenderConfig> {
    find_render_config_by_article(ctx.store.as_ref(), &input.article).await
}

/// 記事の公開状態を返す。未登録なら未公開
pub async fn get_item_exists(ctx: &AppContext, input: ArticleInput) -> QpResult<PublishStatus> {
    get_publish_status(ctx.store.as_ref(), &input.article).await
}

/// テンプレートをレンダリングしてQiitaに記事を作成する
pub async fn create_item(ctx: &AppContext, input: CreateItemInput) -> QpResult<PublishedItem> {
    let body = ctx
        .renderer
        .render(&input.template_name, &input.template_variables)?;
    info!(article = %input.article, length = body.len(), "本文をレンダリングしました");

    let draft = ItemDraft {
        title: input.article,
        body,
        tags: input.tags,
    };
    let item = ctx.blog.create_item(&draft).await?;
    Ok(item.into())
}

/// テンプレートをレンダリングしてQiitaの記事本文を更新する
///
/// タイトルとタグは変更しない。
pub async fn update_item(ctx: &AppContext, input: UpdateItemInput) -> QpResult<PublishedItem> {
    let Some(item_id) = input.publish_status.item_id.as_deref() else {
        return Err(QpError::invalid_state(
            "update_item: publish_status.item_id がありません",
        ));
    };

    let body = ctx
        .renderer
        .render(&input.template_name, &input.template_variables)?;
    info!(item_id, length = body.len(), "本文をレンダリングしました");

    let item = update_item_body(ctx.blog.as_ref(), item_id, body).await?;
    Ok(item.into())
}

/// 記事を公開済みとして記録する。入力をそのまま返す
pub async fn update_publish_status(
    ctx: &AppContext,
    input: PublishStatusInput,
) -> QpResult<PublishStatusInput> {
    put_published_status(ctx.store.as_ref(), &input.article, &input.item_id).await?;
    Ok(input)
}

/// ステップを1つ実行し、出力を状態へ反映する
pub async fn run_step(
    ctx: &AppContext,
    step: Step,
    state: WorkflowState,
) -> QpResult<WorkflowState> {
    with_logging(step.as_str(), state, |state| async move {
        match step {
            Step::FindTemplateByArticle => {
                let config = find_template_by_article(ctx, state.extract(step)?).await?;
                state.merge(&config)
            }
            Step::GetItemExists => {
                let status = get_item_exists(ctx, state.extract(step)?).await?;
                state.insert("publish_status", &status)
            }
            Step::CreateItem => {
                let item = create_item(ctx, state.extract(step)?).await?;
                state.merge(&item)
            }
            Step::UpdateItem => {
                let item = update_item(ctx, state.extract(step)?).await?;
                state.merge(&item)
            }
            Step::UpdatePublishStatus => {
                update_publish_status(ctx, state.extract(step)?).await?;
                Ok(state)
            }
        }
    })
    .await
}

/// ワークフロー全体をプロセス内で順に実行する
///
/// 公開済みで記事IDがあれば更新、なければ作成する。
pub async fn run_publish_workflow(ctx: &AppContext, article: &str) -> QpResult<WorkflowState> {
    let mut state = WorkflowState::new(article);
    state = run_step(ctx, Step::FindTemplateByArticle, state).await?;
    state = run_step(ctx, Step::GetItemExists, state).await?;

    let status: PublishStatus = state
        .get("publish_status")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| QpError::invalid_state(format!("publish_status: {}", e)))?
        .unwrap_or_default();
    let next = if status.updatable_item_id().is_some() {
        Step::UpdateItem
    } else {
        Step::CreateItem
    };

    state = run_step(ctx, next, state).await?;
    run_step(ctx, Step::UpdatePublishStatus, state).await
}
