use crate::infra::loader::load_text;
use crate::types::{InfraError, QpError, QpResult};
use handlebars::Handlebars;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// 組み込みのポートフォリオテンプレート名
pub const PORTFOLIO_TEMPLATE: &str = "portfolio.md";

const PORTFOLIO_SOURCE: &str = include_str!("../../templates/portfolio.md");

/// 名前で選んだテンプレートをテンプレート変数でレンダリングする
///
/// 出力はMarkdownなのでHTMLエスケープは行わない。未定義の変数は空文字になる。
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// 組み込みテンプレートのみを持つレンダラを作成
    pub fn new() -> QpResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(false);

        let mut renderer = Self { registry };
        renderer.register(PORTFOLIO_TEMPLATE, PORTFOLIO_SOURCE)?;
        Ok(renderer)
    }

    /// ディレクトリ内のファイルをファイル名で登録したレンダラを作成
    ///
    /// 同名の組み込みテンプレートは上書きされる。
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> QpResult<Self> {
        let dir = dir.as_ref();
        let mut renderer = Self::new()?;

        let entries =
            fs::read_dir(dir).map_err(|e| InfraError::file_system(dir.display().to_string(), e))?;
        for entry in entries {
            let path = entry
                .map_err(|e| InfraError::file_system(dir.display().to_string(), e))?
                .path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let source = load_text(&path)?;
            renderer.register(name, &source)?;
        }
        Ok(renderer)
    }

    /// テンプレートを登録する
    pub fn register(&mut self, name: &str, source: &str) -> QpResult<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| QpError::template(name, e))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// テンプレート変数をトップレベルの引数としてレンダリングする
    pub fn render(&self, template_name: &str, variables: &Map<String, Value>) -> QpResult<String> {
        if !self.has_template(template_name) {
            return Err(QpError::not_found(format!("テンプレート: {}", template_name)));
        }
        self.registry
            .render(template_name, variables)
            .map_err(|e| QpError::render(template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variables() -> Map<String, Value> {
        json!({
            "items": [
                {"name": "Rustで<b>CLI</b>", "link": "https://qiita.com/u/items/1", "likes": 12}
            ],
            "tags_count": [{"name": "Rust", "count": 4}]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_render_builtin_portfolio() {
        let renderer = TemplateRenderer::new().unwrap();

        let content = renderer.render(PORTFOLIO_TEMPLATE, &variables()).unwrap();

        assert!(content.contains("| Rust | 4 |"));
        assert!(content.contains("[Rustで<b>CLI</b>](https://qiita.com/u/items/1) (12 いいね)"));
    }

    #[test]
    fn test_missing_variables_render_empty() {
        let mut renderer = TemplateRenderer::new().unwrap();
        renderer.register("greeting", "こんにちは{{user}}さん").unwrap();

        let content = renderer.render("greeting", &Map::new()).unwrap();

        assert_eq!(content, "こんにちはさん");
    }

    #[test]
    fn test_unknown_template_is_not_found() {
        let renderer = TemplateRenderer::new().unwrap();

        let result = renderer.render("missing.md", &variables());

        assert!(matches!(result, Err(QpError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut renderer = TemplateRenderer::new().unwrap();

        let result = renderer.register("broken", "{{#each items}}");

        assert!(matches!(result, Err(QpError::Template { .. })));
    }

    #[test]
    fn test_from_dir_registers_by_file_name() {
        let renderer = TemplateRenderer::from_dir("templates").unwrap();
        assert!(renderer.has_template(PORTFOLIO_TEMPLATE));

        assert!(TemplateRenderer::from_dir("no_such_dir").is_err());
    }
}
