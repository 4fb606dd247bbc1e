use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ArticleStatus,
    error::ApiError,
    protocol::{ArticleListQuery, ArticlePage, Tag},
};
use tracing::debug;
use url::Url;

use crate::{
    auth::{inject_auth_header, AuthSession},
    error::QueryError,
};

/// Read side of the remote article API.
#[async_trait]
pub trait ArticleQueryService: Send + Sync {
    async fn find_recent(&self, page: u32, limit: u32) -> Result<ArticlePage>;
    async fn find_by_popularity(&self, page: u32, limit: u32) -> Result<ArticlePage>;
    async fn find_by_tag(&self, page: u32, limit: u32, tag: &str) -> Result<ArticlePage>;
    async fn get_articles(
        &self,
        page: u32,
        limit: u32,
        status: ArticleStatus,
    ) -> Result<ArticlePage>;
    async fn get_tag_vocabulary(&self) -> Result<Vec<Tag>>;
}

pub struct HttpArticleQueryService {
    http: Client,
    api_url: Url,
    session: Arc<dyn AuthSession>,
}

impl HttpArticleQueryService {
    pub fn new(api_url: &str, session: Arc<dyn AuthSession>) -> Result<Self, QueryError> {
        Self::with_client(Client::new(), api_url, session)
    }

    pub fn with_client(
        http: Client,
        api_url: &str,
        session: Arc<dyn AuthSession>,
    ) -> Result<Self, QueryError> {
        let mut api_url = Url::parse(api_url.trim())?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }
        Ok(Self {
            http,
            api_url,
            session,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, QueryError> {
        Ok(self.api_url.join(path)?)
    }

    async fn list(&self, query: ArticleListQuery) -> Result<ArticlePage, QueryError> {
        let url = self.endpoint("article")?;
        debug!(
            page = query.page_number,
            size = query.page_size,
            status = %query.status,
            tag = query.tag.as_deref().unwrap_or(""),
            "requesting article page"
        );
        let ctx = self.session.request_context();
        let response = inject_auth_header(self.http.get(url).query(&query), &ctx)?
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, QueryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.bytes().await?;
    match serde_json::from_slice::<ApiError>(&body) {
        Ok(error) => Err(QueryError::Api { status, error }),
        Err(_) => Err(QueryError::Status { status }),
    }
}

#[async_trait]
impl ArticleQueryService for HttpArticleQueryService {
    async fn find_recent(&self, page: u32, limit: u32) -> Result<ArticlePage> {
        self.list(ArticleListQuery::new(page, limit, ArticleStatus::Published))
            .await
            .with_context(|| format!("failed to fetch recent articles page {page}"))
    }

    async fn find_by_popularity(&self, page: u32, limit: u32) -> Result<ArticlePage> {
        self.list(ArticleListQuery::new(page, limit, ArticleStatus::Published).by_popularity())
            .await
            .with_context(|| format!("failed to fetch popular articles page {page}"))
    }

    async fn find_by_tag(&self, page: u32, limit: u32, tag: &str) -> Result<ArticlePage> {
        self.list(ArticleListQuery::new(page, limit, ArticleStatus::Published).with_tag(tag))
            .await
            .with_context(|| format!("failed to fetch articles tagged '{tag}' page {page}"))
    }

    async fn get_articles(
        &self,
        page: u32,
        limit: u32,
        status: ArticleStatus,
    ) -> Result<ArticlePage> {
        self.list(ArticleListQuery::new(page, limit, status))
            .await
            .with_context(|| {
                format!(
                    "failed to fetch {} articles page {page}",
                    status.as_query_value()
                )
            })
    }

    async fn get_tag_vocabulary(&self) -> Result<Vec<Tag>> {
        let url = self.endpoint("tag")?;
        let ctx = self.session.request_context();
        let response = inject_auth_header(self.http.get(url), &ctx)?
            .send()
            .await
            .context("failed to fetch tag vocabulary")?;
        let tags: Vec<Tag> = read_json(response)
            .await
            .context("failed to decode tag vocabulary")?;
        Ok(tags)
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
