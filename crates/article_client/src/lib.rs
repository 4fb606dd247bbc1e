pub mod auth;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod presentation;
pub mod query;

pub use auth::{AuthSession, RequestContext, StaticSession};
pub use controller::{ArticleListController, PageMode, SortMode, ViewState};
pub use error::QueryError;
pub use navigation::{NavigationService, UrlNavigation};
pub use query::{ArticleQueryService, HttpArticleQueryService};
