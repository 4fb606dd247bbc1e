use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ArticleId, ArticleStatus, TagId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: UserId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub status: ArticleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Estimated reading time in minutes, filled in client side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
}

/// Envelope returned by the paginated article endpoints.
///
/// `has_next` is absent on servers that do not report it; callers then fall
/// back to comparing the page length against the requested size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub content: Vec<Article>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_popularity: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ArticleListQuery {
    pub fn new(page_number: u32, page_size: u32, status: ArticleStatus) -> Self {
        Self {
            page_number,
            page_size,
            status: status.as_query_value().to_string(),
            by_popularity: None,
            tag: None,
        }
    }

    pub fn by_popularity(mut self) -> Self {
        self.by_popularity = Some(true);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_decodes_camel_case_payload() {
        let raw = r#"{
            "id": 4,
            "title": "Ownership in practice",
            "author": {"id": 9, "fullName": "Ada Lovelace"},
            "tags": [{"id": 1, "name": "rust"}],
            "status": "PUBLISHED",
            "publishedAt": "2023-03-05T10:00:00Z",
            "lastSavedAt": "2023-03-04T08:30:00Z"
        }"#;

        let article: Article = serde_json::from_str(raw).expect("decode article");
        assert_eq!(article.id, ArticleId(4));
        assert_eq!(article.status, ArticleStatus::Published);
        assert_eq!(
            article.author.as_ref().map(|a| a.full_name.as_str()),
            Some("Ada Lovelace")
        );
        assert_eq!(article.tags[0].name, "rust");
        assert!(article.content.is_none());
        assert!(article.reading_time.is_none());
    }

    #[test]
    fn page_envelope_keeps_optional_has_next() {
        let last: ArticlePage =
            serde_json::from_str(r#"{"content": [], "hasNext": false}"#).expect("decode page");
        assert_eq!(last.has_next, Some(false));

        let unreported: ArticlePage =
            serde_json::from_str(r#"{"content": []}"#).expect("decode page");
        assert_eq!(unreported.has_next, None);
    }

    #[test]
    fn popularity_query_serializes_flag_only_when_set() {
        let plain = serde_json::to_value(ArticleListQuery::new(0, 5, ArticleStatus::Published))
            .expect("encode");
        assert!(plain.get("byPopularity").is_none());
        assert_eq!(plain["status"], "published");

        let popular = serde_json::to_value(
            ArticleListQuery::new(2, 5, ArticleStatus::Published).by_popularity(),
        )
        .expect("encode");
        assert_eq!(popular["byPopularity"], true);
        assert_eq!(popular["pageNumber"], 2);
    }
}
