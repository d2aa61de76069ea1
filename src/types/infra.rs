use crate::types::ConfigError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// インフラストラクチャ層のエラー型
/// AWS、HTTP通信、ファイルシステム、シリアライゼーションなど基盤的なエラーを定義
#[derive(Error, Debug)]
pub enum InfraError {
    /// ファイルシステムエラー
    #[error("ファイルシステムエラー: {path} - {source}")]
    FileSystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP通信エラー
    #[error("HTTP通信エラー: {operation} - {source}")]
    Http {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// DynamoDB操作エラー
    #[error("DynamoDBエラー: {operation} - {source}")]
    DynamoDb {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// SQS操作エラー
    #[error("SQSエラー: {operation} - {source}")]
    Sqs {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// Step Functions操作エラー
    #[error("Step Functionsエラー: {operation} - {source}")]
    StepFunctions {
        operation: String,
        #[source]
        source: BoxError,
    },

    /// シリアライゼーションエラー
    #[error("シリアライゼーションエラー: {context} - {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// DynamoDBの属性値が期待する形式ではない
    #[error("属性値が不正です: {attribute} - {reason}")]
    InvalidAttribute { attribute: String, reason: String },

    /// ロガーの初期化エラー
    #[error("テレメトリ初期化エラー: {message}")]
    Telemetry { message: String },

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl InfraError {
    /// ファイルシステムエラーを作成
    pub fn file_system<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// HTTP通信エラーを作成
    pub fn http<O: Into<String>>(operation: O, source: reqwest::Error) -> Self {
        Self::Http {
            operation: operation.into(),
            source,
        }
    }

    /// DynamoDB操作エラーを作成
    pub fn dynamodb<O, E>(operation: O, source: E) -> Self
    where
        O: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DynamoDb {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// SQS操作エラーを作成
    pub fn sqs<O, E>(operation: O, source: E) -> Self
    where
        O: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Sqs {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Step Functions操作エラーを作成
    pub fn step_functions<O, E>(operation: O, source: E) -> Self
    where
        O: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StepFunctions {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// シリアライゼーションエラーを作成
    pub fn serialization<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// 属性値エラーを作成
    pub fn invalid_attribute<A: Into<String>, R: Into<String>>(attribute: A, reason: R) -> Self {
        Self::InvalidAttribute {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// テレメトリ初期化エラーを作成
    pub fn telemetry<M: Into<String>>(message: M) -> Self {
        Self::Telemetry {
            message: message.into(),
        }
    }
}

/// インフラエラーのResult型エイリアス
pub type InfraResult<T> = std::result::Result<T, InfraError>;
