use crate::domain::article::ArticleStore;
use crate::infra::api::qiita::{BlogClient, QiitaClient};
use crate::infra::queue::{queue_url, JobQueue, SqsJobQueue};
use crate::infra::settings::Settings;
use crate::infra::sfn::{Orchestrator, SfnOrchestrator};
use crate::infra::storage::DynamoArticleStore;
use crate::infra::template::TemplateRenderer;
use crate::types::QpResult;
use aws_config::Region;
use std::sync::Arc;
use tracing::info;

/// プロセス内で共有する外部クライアント一式
///
/// 起動時に一度だけ組み立て、各ハンドラへ参照で渡す。
pub struct AppContext {
    pub settings: Settings,
    pub store: Arc<dyn ArticleStore>,
    pub queue: Arc<dyn JobQueue>,
    pub orchestrator: Arc<dyn Orchestrator>,
    pub blog: Arc<dyn BlogClient>,
    pub renderer: TemplateRenderer,
}

impl AppContext {
    /// 任意の実装を注入して組み立てる
    pub fn new(
        settings: Settings,
        store: Arc<dyn ArticleStore>,
        queue: Arc<dyn JobQueue>,
        orchestrator: Arc<dyn Orchestrator>,
        blog: Arc<dyn BlogClient>,
        renderer: TemplateRenderer,
    ) -> Self {
        Self {
            settings,
            store,
            queue,
            orchestrator,
            blog,
            renderer,
        }
    }

    /// 設定からAWS・Qiitaのクライアントを作成して組み立てる
    pub async fn from_settings(settings: Settings) -> QpResult<Self> {
        let aws_config = aws_config::from_env()
            .region(Region::new(settings.aws_region.clone()))
            .load()
            .await;

        let store = DynamoArticleStore::new(
            aws_sdk_dynamodb::Client::new(&aws_config),
            settings.article_table_name.clone(),
        );
        let queue = SqsJobQueue::new(
            aws_sdk_sqs::Client::new(&aws_config),
            queue_url(
                &settings.aws_account_id,
                &settings.aws_region,
                &settings.update_template_variables_queue_name,
            ),
        );
        let orchestrator = SfnOrchestrator::new(
            aws_sdk_sfn::Client::new(&aws_config),
            settings.aws_region.clone(),
            settings.aws_account_id.clone(),
        );
        let blog = QiitaClient::new(
            settings.qiita_base_url.clone(),
            settings.qiita_api_token.clone(),
        );
        let renderer = match &settings.template_dir {
            Some(dir) => TemplateRenderer::from_dir(dir)?,
            None => TemplateRenderer::new()?,
        };

        info!(
            env = %settings.env,
            table = %settings.article_table_name,
            queue = %queue.queue_url(),
            "クライアントを初期化しました"
        );

        Ok(Self::new(
            settings,
            Arc::new(store),
            Arc::new(queue),
            Arc::new(orchestrator),
            Arc::new(blog),
            renderer,
        ))
    }
}
