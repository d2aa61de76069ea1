use crate::types::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Qiita APIの既定エンドポイント
pub const DEFAULT_QIITA_BASE_URL: &str = "https://qiita.com";
/// Qiitaのper_pageの上限
pub const MAX_QIITA_PAGE_SIZE: u32 = 100;

/// ログの出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Compact,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(ConfigError::invalid_value(
                "LOG_FORMAT",
                format!("json または compact を指定してください: {}", other),
            )),
        }
    }
}

/// 環境変数から組み立てるアプリケーション設定
#[derive(Debug, Clone)]
pub struct Settings {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub qiita_api_token: String,
    pub qiita_base_url: String,
    pub qiita_page_size: u32,
    pub article_table_name: String,
    pub update_template_variables_queue_name: String,
    pub publisher_statemachine_name: String,
    pub aws_account_id: String,
    pub aws_region: String,
    pub template_dir: Option<PathBuf>,
}

/// `.env.{QP_ENV}` を読み込む。ファイルがなければ何もしない。
///
/// 読み込んだファイルのパスを返す。
pub fn load_env_file() -> Option<PathBuf> {
    let qp_env = env::var("QP_ENV").unwrap_or_else(|_| "dev".to_string());
    dotenvy::from_filename(format!(".env.{}", qp_env)).ok()
}

impl Settings {
    /// プロセスの環境変数から設定を読み込む
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字の値は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| get(name).ok_or_else(|| ConfigError::missing_env_var(name));

        let log_format = match get("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::Json,
        };

        let qiita_page_size = match get("QIITA_PAGE_SIZE") {
            Some(value) => parse_page_size(&value)?,
            None => MAX_QIITA_PAGE_SIZE,
        };

        Ok(Self {
            env: get("QP_ENV").unwrap_or_else(|| "dev".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "DEBUG".to_string()),
            log_format,
            qiita_api_token: required("QIITA_API_TOKEN")?,
            qiita_base_url: get("QIITA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_QIITA_BASE_URL.to_string()),
            qiita_page_size,
            article_table_name: required("ARTICLE_TABLE_NAME")?,
            update_template_variables_queue_name: required(
                "UPDATE_TEMPLATE_VARIABLES_QUEUE_NAME",
            )?,
            publisher_statemachine_name: required("PUBLISHER_STATEMACHINE_NAME")?,
            aws_account_id: required("AWS_ACCOUNT_ID")?,
            aws_region: required("AWS_REGION")?,
            template_dir: get("TEMPLATE_DIR").map(PathBuf::from),
        })
    }
}

fn parse_page_size(value: &str) -> ConfigResult<u32> {
    let size: u32 = value
        .trim()
        .parse()
        .map_err(|_| {
            ConfigError::invalid_value("QIITA_PAGE_SIZE", format!("数値ではありません: {}", value))
        })?;
    if size == 0 || size > MAX_QIITA_PAGE_SIZE {
        return Err(ConfigError::invalid_value(
            "QIITA_PAGE_SIZE",
            format!("1から{}の範囲で指定してください: {}", MAX_QIITA_PAGE_SIZE, size),
        ));
    }
    Ok(size)
}
