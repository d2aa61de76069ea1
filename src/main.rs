use anyhow::Context;
use clap::{Parser, Subcommand};
use qiita_portfolio::app::consumer::{consume_event, parse_event, poll_queue};
use qiita_portfolio::app::context::AppContext;
use qiita_portfolio::app::publish::{run_publish_workflow, run_step, Step, WorkflowState};
use qiita_portfolio::app::summarize::{run_contribution_summary, ARTICLE_NAME};
use qiita_portfolio::domain::article::seed_template;
use qiita_portfolio::domain::item::Tag;
use qiita_portfolio::infra::loader::load_text_or_stdin;
use qiita_portfolio::infra::settings::{load_env_file, Settings};
use qiita_portfolio::infra::telemetry;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Qiitaの投稿統計をポートフォリオ記事として公開する
#[derive(Debug, Parser)]
#[command(name = "qiita-portfolio", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 投稿記事を集計してテンプレート変数をキューへ送る
    Summarize,
    /// テンプレート変数のメッセージを処理してワークフローを開始する
    Consume {
        /// SQSイベントのJSONファイル（`-` で標準入力）。省略時はキューを1回ポーリングする
        #[arg(long)]
        event: Option<PathBuf>,
        /// ポーリングで受信する最大件数
        #[arg(long, default_value_t = 10)]
        max_messages: i32,
    },
    /// ワークフローのステップを1つ実行する
    Step {
        /// find_template_by_article, get_item_exists, create_item, update_item, update_publish_status
        step: Step,
        /// 状態のJSONファイル（省略時は標準入力）
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// ワークフロー全体をローカルで実行する
    Publish {
        #[arg(long, default_value = ARTICLE_NAME)]
        article: String,
    },
    /// 記事のレンダリング設定を登録する
    SeedTemplate {
        #[arg(long, default_value = ARTICLE_NAME)]
        article: String,
        #[arg(long)]
        template_name: String,
        /// Qiitaの記事に付けるタグ（複数指定可）
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 環境変数を読み込み（.env.{QP_ENV} があれば使用）
    let env_file = load_env_file();
    let settings = Settings::from_env().context("設定の読み込みに失敗しました")?;
    telemetry::init(&settings.log_level, settings.log_format)?;
    if let Some(path) = env_file {
        info!(path = %path.display(), "環境変数ファイルを読み込みました");
    }

    let ctx = AppContext::from_settings(settings).await?;

    match cli.command {
        Command::Summarize => {
            let variables = run_contribution_summary(&ctx).await?;
            print_json(&variables)?;
        }
        Command::Consume {
            event: Some(path),
            ..
        } => {
            let raw = load_text_or_stdin(Some(path))?;
            let updated = consume_event(&ctx, parse_event(&raw)?).await?;
            print_json(&updated)?;
        }
        Command::Consume {
            event: None,
            max_messages,
        } => {
            let updated = poll_queue(&ctx, max_messages).await?;
            print_json(&updated)?;
        }
        Command::Step { step, input } => {
            let raw = load_text_or_stdin(input)?;
            let state = run_step(&ctx, step, WorkflowState::from_json(&raw)?).await?;
            print_json(&state)?;
        }
        Command::Publish { article } => {
            let state = run_publish_workflow(&ctx, &article).await?;
            print_json(&state)?;
        }
        Command::SeedTemplate {
            article,
            template_name,
            tags,
        } => {
            if !ctx.renderer.has_template(&template_name) {
                anyhow::bail!("テンプレートが登録されていません: {}", template_name);
            }
            let tags = tags.into_iter().map(Tag::new).collect();
            let record = seed_template(ctx.store.as_ref(), &article, &template_name, tags).await?;
            print_json(&record)?;
        }
    }

    Ok(())
}
