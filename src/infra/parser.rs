use crate::types::{QpError, QpResult};
use url::Url;

/// QiitaのLinkヘッダから得られるページネーションリンク
///
/// 複数ページある場合の例:
///
/// ```text
/// <https://qiita.com/api/v2/authenticated_user/items?page=1&per_page=5>; rel="first",
/// <https://qiita.com/api/v2/authenticated_user/items?page=2&per_page=5>; rel="next",
/// <https://qiita.com/api/v2/authenticated_user/items?page=9&per_page=5>; rel="last"
/// ```
///
/// 1ページしかない場合は `first` と `last` が同じURLになる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub first: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub last: Option<String>,
}

/// Linkヘッダの値を解析する
///
/// 解釈できないエントリや未知のrelは無視する。
pub fn parse_link_header(header: &str) -> PageLinks {
    let mut links = PageLinks::default();

    for entry in header.split(',') {
        let mut parts = entry.split(';').map(str::trim);
        let Some(target) = parts.next() else {
            continue;
        };
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            continue;
        };

        for param in parts {
            let Some(rel) = param.strip_prefix("rel=") else {
                continue;
            };
            let url = Some(url.to_string());
            match rel.trim_matches('"') {
                "first" => links.first = url,
                "prev" => links.prev = url,
                "next" => links.next = url,
                "last" => links.last = url,
                _ => {}
            }
        }
    }

    links
}

/// ページネーションのURLから `page` クエリの値を取り出す
pub fn parse_page_number(link: &str) -> QpResult<u32> {
    let url = Url::parse(link).map_err(|_| QpError::invalid_pagination_link(link))?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
        .ok_or_else(|| QpError::invalid_pagination_link(link))
}
