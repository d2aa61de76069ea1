use crate::types::InfraError;
use thiserror::Error;

/// 記事の集計・公開処理で発生するエラー型
///
/// ワークフローの各ステップとキューのハンドラはこのエラーをログに出力した上で
/// そのまま呼び出し元へ返す。再試行はStep FunctionsとSQSの再配信に任せる。
#[derive(Error, Debug)]
pub enum QpError {
    /// レンダリング設定・テンプレート・Qiitaの記事が見つからない
    #[error("見つかりません: {what}")]
    NotFound { what: String },

    /// Qiitaへの記事作成が拒否された
    #[error("記事の作成に失敗しました: {message}")]
    ItemCreate { message: String },

    /// Qiitaへの記事更新が拒否された
    #[error("記事の更新に失敗しました: {message}")]
    ItemUpdate { message: String },

    /// 投稿一覧の集計に失敗した
    #[error("投稿記事の集計に失敗しました: {source}")]
    Aggregation {
        #[source]
        source: Box<QpError>,
    },

    /// Qiita APIがエラーを返した
    #[error("Qiita APIエラー: status={status} {message}")]
    Api { status: u16, message: String },

    /// ページネーションのLinkが解析できない
    #[error("ページネーションのリンクが不正です: {link}")]
    InvalidPaginationLink { link: String },

    /// テンプレートの登録に失敗した
    #[error("テンプレートの登録に失敗しました: {template_name} - {source}")]
    Template {
        template_name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// テンプレートのレンダリングに失敗した
    #[error("テンプレートのレンダリングに失敗しました: {template_name} - {source}")]
    Render {
        template_name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// ワークフローの状態がステップの入力として不正
    #[error("ワークフローの状態が不正です: {reason}")]
    InvalidState { reason: String },

    /// インフラ層のエラー
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl QpError {
    /// 未検出エラーを作成
    pub fn not_found<W: Into<String>>(what: W) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// 記事作成エラーを作成
    pub fn item_create<M: Into<String>>(message: M) -> Self {
        Self::ItemCreate {
            message: message.into(),
        }
    }

    /// 記事更新エラーを作成
    pub fn item_update<M: Into<String>>(message: M) -> Self {
        Self::ItemUpdate {
            message: message.into(),
        }
    }

    /// 集計エラーで包む
    pub fn aggregation(source: QpError) -> Self {
        Self::Aggregation {
            source: Box::new(source),
        }
    }

    /// APIエラーを作成
    pub fn api<M: Into<String>>(status: u16, message: M) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// ページネーションリンクエラーを作成
    pub fn invalid_pagination_link<L: Into<String>>(link: L) -> Self {
        Self::InvalidPaginationLink { link: link.into() }
    }

    /// テンプレート登録エラーを作成
    pub fn template<N: Into<String>>(template_name: N, source: handlebars::TemplateError) -> Self {
        Self::Template {
            template_name: template_name.into(),
            source: Box::new(source),
        }
    }

    /// レンダリングエラーを作成
    pub fn render<N: Into<String>>(template_name: N, source: handlebars::RenderError) -> Self {
        Self::Render {
            template_name: template_name.into(),
            source: Box::new(source),
        }
    }

    /// 不正な状態エラーを作成
    pub fn invalid_state<R: Into<String>>(reason: R) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

/// ドメインエラーのResult型エイリアス
pub type QpResult<T> = std::result::Result<T, QpError>;
