use url::Url;

pub const SORT_BY_PARAM: &str = "sortBy";
pub const TAG_PARAM: &str = "tag";

/// Reflects the list filter into the navigable location.
pub trait NavigationService: Send {
    fn query_param(&self, name: &str) -> Option<String>;
    fn set_query_param(&mut self, name: &str, value: &str);
    fn remove_query_param(&mut self, name: &str);
    fn current_url(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct UrlNavigation {
    url: Url,
}

impl UrlNavigation {
    pub fn new(start_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(start_url)?,
        })
    }

    fn rewrite_query(&mut self, name: &str, value: Option<&str>) {
        let mut pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        if let Some(value) = value {
            pairs.push((name.to_string(), value.to_string()));
        }

        if pairs.is_empty() {
            self.url.set_query(None);
        } else {
            self.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
    }
}

impl NavigationService for UrlNavigation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn set_query_param(&mut self, name: &str, value: &str) {
        self.rewrite_query(name, Some(value));
    }

    fn remove_query_param(&mut self, name: &str) {
        self.rewrite_query(name, None);
    }

    fn current_url(&self) -> String {
        self.url.to_string()
    }
}
