use crate::domain::item::Item;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::HashMap;

/// タグの出現回数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: u64,
}

/// いいねの多い記事
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedItem {
    pub name: String,
    pub link: String,
    pub likes: u64,
}

/// ポートフォリオ記事のテンプレート変数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariables {
    pub items: Vec<LikedItem>,
    pub tags_count: Vec<TagCount>,
}

impl TemplateVariables {
    /// 記事ストアとキューに渡すJSONオブジェクトへ変換する
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "items".to_string(),
            Value::Array(self.items.iter().map(liked_item_value).collect()),
        );
        map.insert(
            "tags_count".to_string(),
            Value::Array(self.tags_count.iter().map(tag_count_value).collect()),
        );
        map
    }
}

fn liked_item_value(item: &LikedItem) -> Value {
    serde_json::json!({ "name": item.name, "link": item.link, "likes": item.likes })
}

fn tag_count_value(tag: &TagCount) -> Value {
    serde_json::json!({ "name": tag.name, "count": tag.count })
}

/// 全記事のタグを数え、出現回数の多い順に上位 `n` 件を返す
///
/// 同数の場合は最初に出現した順を保つ。
pub fn most_frequent_tags(items: &[Item], n: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tag in items.iter().flat_map(|item| item.tags.iter()) {
        match index.get(tag.name.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(tag.name.as_str(), counts.len());
                counts.push(TagCount {
                    name: tag.name.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by_keyは安定ソート
    counts.sort_by_key(|tag| Reverse(tag.count));
    counts.truncate(n);
    counts
}

/// いいね数の多い順に上位 `n` 件の記事を返す
///
/// いいね数のない記事は0件として扱い、同数の場合は元の並び順を保つ。
pub fn most_liked_items(items: &[Item], n: usize) -> Vec<LikedItem> {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by_key(|item| Reverse(item.likes()));

    sorted
        .into_iter()
        .take(n)
        .map(|item| LikedItem {
            name: item.title.clone(),
            link: item.url.clone(),
            likes: item.likes(),
        })
        .collect()
}

/// 投稿記事からテンプレート変数を組み立てる
pub fn summarize_items(items: &[Item], max_tags: usize, max_liked: usize) -> TemplateVariables {
    TemplateVariables {
        items: most_liked_items(items, max_liked),
        tags_count: most_frequent_tags(items, max_tags),
    }
}
