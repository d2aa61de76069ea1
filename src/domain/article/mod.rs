pub mod model;
pub mod repository;
pub mod service;

// 公開APIの再エクスポート

// model.rsから
pub use model::{ParameterType, PublishStatus, RenderConfig, TemplateRecord};

// repository.rsから
pub use repository::ArticleStore;

// service.rsから
pub use service::{
    find_render_config_by_article, get_publish_status, put_article_template_variables,
    put_published_status, seed_template,
};
