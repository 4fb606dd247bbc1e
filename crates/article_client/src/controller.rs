//! Article list view state and the queries that feed it.
//!
//! Fetches run as spawned tasks and report back over a channel; completions
//! are applied on the owner's task through [`ArticleListController::poll`],
//! [`ArticleListController::next_completion`] or
//! [`ArticleListController::settle`]. Each stream (tags, articles) carries a
//! generation counter so that only the newest fetch can touch the state.

use std::{fmt, str::FromStr, sync::Arc};

use anyhow::{anyhow, Result};
use shared::{
    domain::ArticleStatus,
    protocol::{Article, ArticlePage, Tag},
};
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    navigation::{NavigationService, SORT_BY_PARAM, TAG_PARAM},
    presentation::{
        annotate_reading_time, matches_search, sort_by_last_saved, sort_by_popularity,
        sort_by_recency, sort_by_trend,
    },
    query::ArticleQueryService,
};

pub const DEFAULT_PAGE_ITEMS_LIMIT: u32 = 5;
const MAX_PAGE_ITEMS_LIMIT: u32 = 100;
const POPULAR_SORT_VALUE: &str = "popular";
pub const LOAD_ERROR_MESSAGE: &str = "Oops...! The articles could not be loaded.";

/// Tabs offered to the user above the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Recent,
    Popular,
    Trending,
    Tags,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(SortMode::Recent),
            "popular" => Ok(SortMode::Popular),
            "trending" => Ok(SortMode::Trending),
            "tags" => Ok(SortMode::Tags),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

/// What the cached sequence currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMode {
    Recent,
    Popular,
    Trending,
    Tag(String),
    Drafts,
}

impl PageMode {
    /// Mode implied by the location: `tag` wins over `sortBy`, which wins
    /// over plain recency.
    pub fn from_navigation(navigation: &dyn NavigationService) -> Self {
        if let Some(tag) = navigation
            .query_param(TAG_PARAM)
            .filter(|tag| !tag.is_empty())
        {
            return PageMode::Tag(tag);
        }
        match navigation.query_param(SORT_BY_PARAM).as_deref() {
            Some(POPULAR_SORT_VALUE) => PageMode::Popular,
            _ => PageMode::Recent,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            PageMode::Tag(tag) => Some(tag),
            PageMode::Recent | PageMode::Popular | PageMode::Trending | PageMode::Drafts => None,
        }
    }

    fn listed_status(&self) -> ArticleStatus {
        match self {
            PageMode::Drafts => ArticleStatus::Draft,
            PageMode::Recent | PageMode::Popular | PageMode::Trending | PageMode::Tag(_) => {
                ArticleStatus::Published
            }
        }
    }

    fn order(&self, articles: &mut [Article]) {
        match self {
            PageMode::Recent => sort_by_recency(articles),
            PageMode::Popular => sort_by_popularity(articles),
            PageMode::Trending => sort_by_trend(articles),
            PageMode::Tag(_) => {}
            PageMode::Drafts => sort_by_last_saved(articles),
        }
    }
}

impl fmt::Display for PageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageMode::Recent => f.write_str("recent"),
            PageMode::Popular => f.write_str("popular"),
            PageMode::Trending => f.write_str("trending"),
            PageMode::Tag(tag) => write!(f, "tag:{tag}"),
            PageMode::Drafts => f.write_str("drafts"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub active_tab: SortMode,
    pub mode: PageMode,
    /// Tag highlighted in the dropdown; cleared by any tab selection.
    pub active_tag: Option<String>,
    pub tags_dropdown_open: bool,
    pub page_number: u32,
    pub page_items_limit: u32,
    pub loading: bool,
    pub tags_loading: bool,
    pub error_message: Option<String>,
    pub has_more: bool,
    pub main_page: bool,
}

impl ViewState {
    fn new(page_items_limit: u32) -> Self {
        Self {
            active_tab: SortMode::Recent,
            mode: PageMode::Recent,
            active_tag: None,
            tags_dropdown_open: false,
            page_number: 0,
            page_items_limit,
            loading: false,
            tags_loading: false,
            error_message: None,
            has_more: true,
            main_page: true,
        }
    }

    pub fn active_tag_filter(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub mode: PageMode,
    pub page: u32,
    pub limit: u32,
    pub append: bool,
}

enum Completion {
    Tags {
        generation: u64,
        result: Result<Vec<Tag>>,
    },
    Articles {
        generation: u64,
        request: PageRequest,
        result: Result<ArticlePage>,
    },
}

/// One logical fetch stream: the newest generation and its task.
#[derive(Default)]
struct StreamSlot {
    generation: u64,
    pending: bool,
    task: Option<JoinHandle<()>>,
}

impl StreamSlot {
    fn begin(&mut self) -> u64 {
        self.abort_task();
        self.generation += 1;
        self.pending = true;
        self.generation
    }

    fn accepts(&self, generation: u64) -> bool {
        self.pending && self.generation == generation
    }

    fn finish(&mut self) {
        self.pending = false;
        self.task = None;
    }

    fn cancel(&mut self) {
        self.abort_task();
        self.generation += 1;
        self.pending = false;
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for StreamSlot {
    fn drop(&mut self) {
        self.abort_task();
    }
}

pub struct ArticleListController {
    service: Arc<dyn ArticleQueryService>,
    navigation: Box<dyn NavigationService>,
    state: ViewState,
    articles: Vec<Article>,
    tags: Vec<Tag>,
    tags_stream: StreamSlot,
    articles_stream: StreamSlot,
    in_flight: Option<PageRequest>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    unmounted: bool,
}

impl ArticleListController {
    pub fn new(
        service: Arc<dyn ArticleQueryService>,
        navigation: Box<dyn NavigationService>,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            service,
            navigation,
            state: ViewState::new(DEFAULT_PAGE_ITEMS_LIMIT),
            articles: Vec::new(),
            tags: Vec::new(),
            tags_stream: StreamSlot::default(),
            articles_stream: StreamSlot::default(),
            in_flight: None,
            completions_tx,
            completions_rx,
            unmounted: false,
        }
    }

    pub fn with_page_items_limit(mut self, limit: u32) -> Self {
        self.state.page_items_limit = limit.clamp(1, MAX_PAGE_ITEMS_LIMIT);
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn navigation(&self) -> &dyn NavigationService {
        self.navigation.as_ref()
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// True when neither stream has a fetch in flight.
    pub fn is_idle(&self) -> bool {
        !self.tags_stream.pending && !self.articles_stream.pending
    }

    pub fn mount(&mut self) {
        if self.rejects("mount") {
            return;
        }

        let mode = PageMode::from_navigation(self.navigation.as_ref());
        info!(url = %self.navigation.current_url(), mode = %mode, "mounting article list");

        self.load_tag_vocabulary();
        if mode == PageMode::Popular {
            self.state.active_tab = SortMode::Popular;
        }
        self.fetch_first_page(mode);
    }

    /// Releases both streams; nothing resolves into the state afterwards.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.tags_stream.cancel();
        self.articles_stream.cancel();
        while self.completions_rx.try_recv().is_ok() {}
        info!("article list unmounted");
    }

    pub fn load_tag_vocabulary(&mut self) {
        if self.rejects("load_tag_vocabulary") {
            return;
        }

        self.state.tags_loading = true;
        let generation = self.tags_stream.begin();
        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        debug!(stream = "tags", generation, "issuing tag vocabulary fetch");

        self.tags_stream.task = Some(tokio::spawn(async move {
            let result = service.get_tag_vocabulary().await;
            let _ = tx.send(Completion::Tags { generation, result });
        }));
    }

    pub fn select_sort(&mut self, mode: SortMode) {
        if self.rejects("select_sort") {
            return;
        }

        self.state.active_tab = mode;
        self.state.active_tag = None;
        let page_mode = match mode {
            SortMode::Tags => {
                self.state.tags_dropdown_open = !self.state.tags_dropdown_open;
                self.state.page_number = 0;
                self.state.has_more = true;
                return;
            }
            SortMode::Recent => PageMode::Recent,
            SortMode::Popular => PageMode::Popular,
            SortMode::Trending => PageMode::Trending,
        };

        self.state.tags_dropdown_open = false;
        self.state.main_page = true;
        self.sync_navigation(&page_mode);
        self.fetch_first_page(page_mode);
    }

    pub fn select_tag(&mut self, tag_name: &str) {
        if self.rejects("select_tag") {
            return;
        }
        let tag_name = tag_name.trim();
        if tag_name.is_empty() {
            debug!("ignoring empty tag selection");
            return;
        }

        let page_mode = PageMode::Tag(tag_name.to_string());
        self.state.tags_dropdown_open = false;
        self.state.main_page = true;
        self.sync_navigation(&page_mode);
        self.fetch_first_page(page_mode);
    }

    /// Requests the next page under the mode the location currently implies
    /// and appends it to the cached sequence.
    pub fn load_more(&mut self) {
        if self.rejects("load_more") {
            return;
        }
        if self.state.loading {
            debug!(page = self.state.page_number, "load_more ignored while loading");
            return;
        }
        if !self.state.has_more {
            debug!(page = self.state.page_number, "load_more ignored, list exhausted");
            return;
        }

        let mode = match &self.state.mode {
            PageMode::Drafts => PageMode::Drafts,
            current => match PageMode::from_navigation(self.navigation.as_ref()) {
                PageMode::Recent if *current == PageMode::Trending => PageMode::Trending,
                resolved => resolved,
            },
        };

        self.state.page_number += 1;
        self.state.mode = mode.clone();
        self.state.loading = true;
        self.issue_articles(PageRequest {
            mode,
            page: self.state.page_number,
            limit: self.state.page_items_limit,
            append: true,
        });
    }

    /// Narrows the cached sequence to matches of `key`; reloads the default
    /// query instead of ever showing an empty result.
    pub fn search(&mut self, key: &str) {
        if self.rejects("search") {
            return;
        }

        let key = key.trim();
        if key.is_empty() {
            self.reload_default();
            return;
        }

        let results: Vec<Article> = self
            .articles
            .iter()
            .filter(|article| matches_search(article, key))
            .cloned()
            .collect();

        if results.is_empty() {
            debug!(key, "search matched nothing, reloading");
            self.reload_default();
            return;
        }
        self.articles = results;
    }

    pub fn show_drafts(&mut self) {
        if self.rejects("show_drafts") {
            return;
        }

        self.state.main_page = false;
        self.state.tags_dropdown_open = false;
        self.fetch_first_page(PageMode::Drafts);
    }

    /// Applies every completion already delivered; never waits.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    /// Waits for one completion and applies it. Returns false when nothing
    /// is in flight.
    ///
    /// A fetch task that dies without reporting is applied as a failed fetch
    /// of its stream.
    pub async fn next_completion(&mut self) -> bool {
        loop {
            if self.unmounted || self.is_idle() {
                return false;
            }
            tokio::select! {
                biased;
                Some(completion) = self.completions_rx.recv() => {
                    self.apply(completion);
                    return true;
                }
                outcome = join_task(&mut self.tags_stream.task) => {
                    self.tags_stream.task = None;
                    if let Err(err) = outcome {
                        self.apply(Completion::Tags {
                            generation: self.tags_stream.generation,
                            result: Err(anyhow!("tag vocabulary task died: {err}")),
                        });
                        return true;
                    }
                }
                outcome = join_task(&mut self.articles_stream.task) => {
                    self.articles_stream.task = None;
                    if let (Err(err), Some(request)) = (outcome, self.in_flight.clone()) {
                        self.apply(Completion::Articles {
                            generation: self.articles_stream.generation,
                            request,
                            result: Err(anyhow!("article task died: {err}")),
                        });
                        return true;
                    }
                }
            }
        }
    }

    /// Waits until both streams have resolved.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    fn rejects(&self, operation: &str) -> bool {
        if self.unmounted {
            warn!(operation, "article list is unmounted, ignoring");
        }
        self.unmounted
    }

    fn reload_default(&mut self) {
        match self.state.mode {
            PageMode::Drafts => self.fetch_first_page(PageMode::Drafts),
            _ => {
                self.state.active_tab = SortMode::Recent;
                self.state.tags_dropdown_open = false;
                self.sync_navigation(&PageMode::Recent);
                self.fetch_first_page(PageMode::Recent);
            }
        }
    }

    fn sync_navigation(&mut self, mode: &PageMode) {
        match mode {
            PageMode::Recent | PageMode::Trending => {
                self.navigation.remove_query_param(SORT_BY_PARAM);
                self.navigation.remove_query_param(TAG_PARAM);
            }
            PageMode::Popular => {
                self.navigation.remove_query_param(TAG_PARAM);
                self.navigation
                    .set_query_param(SORT_BY_PARAM, POPULAR_SORT_VALUE);
            }
            PageMode::Tag(tag) => {
                self.navigation.remove_query_param(SORT_BY_PARAM);
                self.navigation.set_query_param(TAG_PARAM, tag);
            }
            PageMode::Drafts => {}
        }
    }

    fn fetch_first_page(&mut self, mode: PageMode) {
        self.state.active_tag = mode.tag().map(str::to_string);
        self.state.mode = mode.clone();
        self.state.page_number = 0;
        self.state.has_more = true;
        self.state.error_message = None;
        self.state.loading = true;
        self.issue_articles(PageRequest {
            mode,
            page: 0,
            limit: self.state.page_items_limit,
            append: false,
        });
    }

    fn issue_articles(&mut self, request: PageRequest) {
        let generation = self.articles_stream.begin();
        self.in_flight = Some(request.clone());
        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        debug!(
            stream = "articles",
            generation,
            mode = %request.mode,
            page = request.page,
            "issuing article fetch"
        );

        self.articles_stream.task = Some(tokio::spawn(async move {
            let result = run_page_query(service.as_ref(), &request).await;
            let _ = tx.send(Completion::Articles {
                generation,
                request,
                result,
            });
        }));
    }

    fn apply(&mut self, completion: Completion) {
        if self.unmounted {
            debug!("dropping completion delivered after unmount");
            return;
        }

        match completion {
            Completion::Tags { generation, result } => {
                if !self.tags_stream.accepts(generation) {
                    debug!(stream = "tags", generation, "discarding stale completion");
                    return;
                }
                self.tags_stream.finish();
                self.state.tags_loading = false;
                match result {
                    Ok(tags) => self.tags = tags,
                    Err(err) => warn!(error = %format!("{err:#}"), "failed to load tag vocabulary"),
                }
            }
            Completion::Articles {
                generation,
                request,
                result,
            } => {
                if !self.articles_stream.accepts(generation) {
                    debug!(stream = "articles", generation, "discarding stale completion");
                    return;
                }
                self.articles_stream.finish();
                self.in_flight = None;
                self.state.loading = false;
                match result {
                    Ok(fetched) => self.accept_page(&request, fetched),
                    Err(err) => {
                        warn!(
                            error = %format!("{err:#}"),
                            mode = %request.mode,
                            page = request.page,
                            "failed to load articles"
                        );
                        if request.append {
                            self.state.page_number = self.state.page_number.saturating_sub(1);
                        }
                        if request.mode != PageMode::Drafts {
                            self.state.error_message = Some(LOAD_ERROR_MESSAGE.to_string());
                        }
                    }
                }
            }
        }
    }

    fn accept_page(&mut self, request: &PageRequest, page: ArticlePage) {
        let ArticlePage {
            content: mut fetched,
            has_next,
        } = page;
        let fetched_count = fetched.len();
        for article in &mut fetched {
            annotate_reading_time(article);
        }

        let status = request.mode.listed_status();
        fetched.retain(|article| article.status == status);
        if fetched.len() != fetched_count {
            debug!(
                dropped = fetched_count - fetched.len(),
                mode = %request.mode,
                "dropped articles with unexpected status"
            );
        }

        if request.append {
            self.articles.extend(fetched);
        } else {
            self.articles = fetched;
        }
        request.mode.order(&mut self.articles);
        let full_page = fetched_count >= request.limit as usize;
        self.state.has_more = full_page && has_next.unwrap_or(true);
    }
}

async fn join_task(task: &mut Option<JoinHandle<()>>) -> Result<(), JoinError> {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn run_page_query(
    service: &dyn ArticleQueryService,
    request: &PageRequest,
) -> Result<ArticlePage> {
    let (page, limit) = (request.page, request.limit);
    match &request.mode {
        PageMode::Recent | PageMode::Trending => service.find_recent(page, limit).await,
        PageMode::Popular => service.find_by_popularity(page, limit).await,
        PageMode::Tag(tag) => service.find_by_tag(page, limit, tag).await,
        PageMode::Drafts => {
            service
                .get_articles(page, limit, ArticleStatus::Draft)
                .await
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
