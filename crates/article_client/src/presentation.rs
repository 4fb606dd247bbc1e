//! Client-side post-processing applied to fetched articles before display.

use std::str::FromStr;

use chrono::{DateTime, Locale, Utc};
use shared::protocol::Article;

pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateLocale {
    #[default]
    French,
    English,
}

impl FromStr for DateLocale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr_fr" | "fr-fr" | "french" => Ok(DateLocale::French),
            "en" | "en_us" | "en-us" | "english" => Ok(DateLocale::English),
            other => Err(format!("unsupported date locale '{other}'")),
        }
    }
}

pub fn format_date(timestamp: &DateTime<Utc>, locale: DateLocale) -> String {
    match locale {
        DateLocale::French => timestamp
            .format_localized("%-d %B %Y", Locale::fr_FR)
            .to_string(),
        DateLocale::English => timestamp
            .format_localized("%B %-d, %Y", Locale::en_US)
            .to_string(),
    }
}

/// Minutes needed to read `text`, rounded up, never less than one.
pub fn estimate_reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE).max(1)).unwrap_or(u32::MAX)
}

pub fn annotate_reading_time(article: &mut Article) {
    let text = article
        .content
        .as_deref()
        .or(article.summary.as_deref())
        .unwrap_or_default();
    article.reading_time = Some(estimate_reading_time(text));
}

/// Case-insensitive substring match over title, tag names and author name.
pub fn matches_search(article: &Article, key: &str) -> bool {
    let key = key.to_lowercase();
    article.title.to_lowercase().contains(&key)
        || article
            .tags
            .iter()
            .any(|tag| tag.name.to_lowercase().contains(&key))
        || article
            .author
            .as_ref()
            .is_some_and(|author| author.full_name.to_lowercase().contains(&key))
}

/// Newest publication first; unpublished entries sink to the end.
pub fn sort_by_recency(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

pub fn sort_by_last_saved(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.last_saved_at.cmp(&a.last_saved_at));
}

// TODO: popularity and trend orderings are delegated to the server query;
// compute them here once the API exposes view and reaction counts.
pub fn sort_by_popularity(_articles: &mut [Article]) {}

pub fn sort_by_trend(_articles: &mut [Article]) {}
