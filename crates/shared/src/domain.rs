use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ArticleId);
id_newtype!(UserId);
id_newtype!(TagId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    /// Value used for the `status` query parameter of the article API.
    pub fn as_query_value(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

/// Identity provider through which the current session was established.
///
/// A session without an origin is a local account; it is represented as
/// `Option::<LoginOrigin>::None` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoginOrigin {
    Github,
    StackOverflow,
    Other(String),
}

impl LoginOrigin {
    pub fn as_str(&self) -> &str {
        match self {
            LoginOrigin::Github => "GITHUB",
            LoginOrigin::StackOverflow => "STACKOVERFLOW",
            LoginOrigin::Other(raw) => raw,
        }
    }
}

impl From<&str> for LoginOrigin {
    fn from(value: &str) -> Self {
        match value {
            "GITHUB" => LoginOrigin::Github,
            "STACKOVERFLOW" => LoginOrigin::StackOverflow,
            other => LoginOrigin::Other(other.to_string()),
        }
    }
}

impl From<String> for LoginOrigin {
    fn from(value: String) -> Self {
        LoginOrigin::from(value.as_str())
    }
}

impl From<LoginOrigin> for String {
    fn from(value: LoginOrigin) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for LoginOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
