use crate::domain::article::{ArticleStore, ParameterType, PublishStatus, TemplateRecord};
use crate::domain::item::Tag;
use crate::types::{InfraError, InfraResult};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

pub(crate) const ATTR_ARTICLE: &str = "article";
pub(crate) const ATTR_PARAMETER_TYPE: &str = "parameter_type";
pub(crate) const ATTR_TEMPLATE_NAME: &str = "template_name";
pub(crate) const ATTR_TEMPLATE_VARIABLES: &str = "template_variables";
pub(crate) const ATTR_TAGS: &str = "tags";
pub(crate) const ATTR_LAST_UPDATED: &str = "last_updated";
pub(crate) const ATTR_PUBLISH_STATUS: &str = "publish_status";
// テーブル上の既存フォーマットに合わせた名前
pub(crate) const ATTR_IS_PUBLISH: &str = "is_publish";
pub(crate) const ATTR_ITEM_ID: &str = "item_id";

type Item = HashMap<String, AttributeValue>;

/// DynamoDBの記事テーブルを使う記事ストア
pub struct DynamoArticleStore {
    client: Client,
    table_name: String,
}

impl DynamoArticleStore {
    pub fn new<T: Into<String>>(client: Client, table_name: T) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn get(&self, article: &str, parameter_type: ParameterType) -> InfraResult<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_ARTICLE, AttributeValue::S(article.to_string()))
            .key(
                ATTR_PARAMETER_TYPE,
                AttributeValue::S(parameter_type.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|e| InfraError::dynamodb(format!("get_item ({})", parameter_type), e))?;
        Ok(output.item().cloned())
    }

    async fn put(&self, item: Item, parameter_type: ParameterType) -> InfraResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfraError::dynamodb(format!("put_item ({})", parameter_type), e))?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for DynamoArticleStore {
    async fn get_template(&self, article: &str) -> InfraResult<Option<TemplateRecord>> {
        self.get(article, ParameterType::Template)
            .await?
            .map(|item| template_from_item(&item))
            .transpose()
    }

    async fn put_template(&self, record: &TemplateRecord) -> InfraResult<()> {
        self.put(template_to_item(record), ParameterType::Template)
            .await
    }

    async fn update_template_variables(
        &self,
        article: &str,
        template_variables: &Map<String, Value>,
        last_updated: i64,
    ) -> InfraResult<TemplateRecord> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_ARTICLE, AttributeValue::S(article.to_string()))
            .key(
                ATTR_PARAMETER_TYPE,
                AttributeValue::S(ParameterType::Template.as_str().to_string()),
            )
            .update_expression("SET template_variables = :tv, last_updated = :ts")
            .expression_attribute_values(
                ":tv",
                to_attribute(&Value::Object(template_variables.clone())),
            )
            .expression_attribute_values(":ts", AttributeValue::N(last_updated.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| InfraError::dynamodb("update_item (template)", e))?;

        let attributes = output.attributes().ok_or_else(|| {
            InfraError::invalid_attribute("Attributes", "更新後の属性が返されませんでした")
        })?;
        template_from_item(attributes)
    }

    async fn get_publish_status(&self, article: &str) -> InfraResult<Option<PublishStatus>> {
        self.get(article, ParameterType::PublishStatus)
            .await?
            .map(|item| publish_status_from_item(&item))
            .transpose()
    }

    async fn put_publish_status(&self, article: &str, status: &PublishStatus) -> InfraResult<()> {
        self.put(
            publish_status_to_item(article, status),
            ParameterType::PublishStatus,
        )
        .await
    }
}

/// JSON値をDynamoDBの属性値へ変換する
///
/// 数値はどの深さでも `N`（10進数文字列）になる。
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute(v)))
                .collect(),
        ),
    }
}

/// DynamoDBの属性値をJSON値へ変換する
///
/// `N` は整数として解釈できれば整数、そうでなければ浮動小数点数になる。
pub fn from_attribute(attribute: &AttributeValue) -> InfraResult<Value> {
    let value = match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<InfraResult<_>>()?,
        ),
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(from_attribute)
                .collect::<InfraResult<_>>()?,
        ),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| -> InfraResult<(String, Value)> {
                    Ok((k.clone(), from_attribute(v)?))
                })
                .collect::<InfraResult<_>>()?,
        ),
        other => {
            return Err(InfraError::invalid_attribute(
                format!("{:?}", other),
                "JSONに変換できない型です",
            ))
        }
    };
    Ok(value)
}

fn parse_number(n: &str) -> InfraResult<Number> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = n.parse::<u64>() {
        return Ok(Number::from(u));
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| InfraError::invalid_attribute(n, "数値として解釈できません"))
}

fn required_string(item: &Item, name: &str) -> InfraResult<String> {
    match item.get(name) {
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(_) => Err(InfraError::invalid_attribute(name, "文字列ではありません")),
        None => Err(InfraError::invalid_attribute(name, "属性がありません")),
    }
}

fn optional_string(item: &Item, name: &str) -> InfraResult<Option<String>> {
    match item.get(name) {
        Some(_) => required_string(item, name).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn template_from_item(item: &Item) -> InfraResult<TemplateRecord> {
    let template_variables = match item.get(ATTR_TEMPLATE_VARIABLES).map(from_attribute) {
        Some(Ok(Value::Object(map))) => map,
        Some(Ok(_)) => {
            return Err(InfraError::invalid_attribute(
                ATTR_TEMPLATE_VARIABLES,
                "マップではありません",
            ))
        }
        Some(Err(e)) => return Err(e),
        None => Map::new(),
    };

    let tags: Vec<Tag> = match item.get(ATTR_TAGS) {
        Some(attribute) => serde_json::from_value(from_attribute(attribute)?)
            .map_err(|e| InfraError::serialization(ATTR_TAGS, e))?,
        None => Vec::new(),
    };

    let last_updated = match item.get(ATTR_LAST_UPDATED) {
        Some(AttributeValue::N(n)) => Some(
            n.parse::<i64>()
                .map_err(|_| InfraError::invalid_attribute(ATTR_LAST_UPDATED, n.clone()))?,
        ),
        Some(_) => {
            return Err(InfraError::invalid_attribute(
                ATTR_LAST_UPDATED,
                "数値ではありません",
            ))
        }
        None => None,
    };

    Ok(TemplateRecord {
        article: required_string(item, ATTR_ARTICLE)?,
        template_name: optional_string(item, ATTR_TEMPLATE_NAME)?,
        template_variables,
        tags,
        last_updated,
    })
}

pub(crate) fn template_to_item(record: &TemplateRecord) -> Item {
    let mut item = Item::new();
    item.insert(
        ATTR_ARTICLE.to_string(),
        AttributeValue::S(record.article.clone()),
    );
    item.insert(
        ATTR_PARAMETER_TYPE.to_string(),
        AttributeValue::S(ParameterType::Template.as_str().to_string()),
    );
    if let Some(name) = &record.template_name {
        item.insert(
            ATTR_TEMPLATE_NAME.to_string(),
            AttributeValue::S(name.clone()),
        );
    }
    item.insert(
        ATTR_TEMPLATE_VARIABLES.to_string(),
        to_attribute(&Value::Object(record.template_variables.clone())),
    );
    let tags = record
        .tags
        .iter()
        .map(|tag| {
            AttributeValue::M(HashMap::from([
                ("name".to_string(), AttributeValue::S(tag.name.clone())),
                (
                    "versions".to_string(),
                    AttributeValue::L(
                        tag.versions
                            .iter()
                            .cloned()
                            .map(AttributeValue::S)
                            .collect(),
                    ),
                ),
            ]))
        })
        .collect();
    item.insert(ATTR_TAGS.to_string(), AttributeValue::L(tags));
    if let Some(ts) = record.last_updated {
        item.insert(
            ATTR_LAST_UPDATED.to_string(),
            AttributeValue::N(ts.to_string()),
        );
    }
    item
}

pub(crate) fn publish_status_from_item(item: &Item) -> InfraResult<PublishStatus> {
    let Some(AttributeValue::M(status)) = item.get(ATTR_PUBLISH_STATUS) else {
        return Err(InfraError::invalid_attribute(
            ATTR_PUBLISH_STATUS,
            "マップがありません",
        ));
    };
    let is_published = match status.get(ATTR_IS_PUBLISH) {
        Some(AttributeValue::Bool(b)) => *b,
        _ => {
            return Err(InfraError::invalid_attribute(
                ATTR_IS_PUBLISH,
                "真偽値がありません",
            ))
        }
    };
    // 空文字は未公開（IDなし）を表す
    let item_id = optional_string(status, ATTR_ITEM_ID)?.filter(|id| !id.is_empty());

    Ok(PublishStatus {
        is_published,
        item_id,
    })
}

pub(crate) fn publish_status_to_item(article: &str, status: &PublishStatus) -> Item {
    let inner = HashMap::from([
        (
            ATTR_IS_PUBLISH.to_string(),
            AttributeValue::Bool(status.is_published),
        ),
        (
            ATTR_ITEM_ID.to_string(),
            AttributeValue::S(status.item_id.clone().unwrap_or_default()),
        ),
    ]);
    HashMap::from([
        (
            ATTR_ARTICLE.to_string(),
            AttributeValue::S(article.to_string()),
        ),
        (
            ATTR_PARAMETER_TYPE.to_string(),
            AttributeValue::S(ParameterType::PublishStatus.as_str().to_string()),
        ),
        (ATTR_PUBLISH_STATUS.to_string(), AttributeValue::M(inner)),
    ])
}
