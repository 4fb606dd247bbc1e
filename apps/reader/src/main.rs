mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use article_client::{
    presentation::{format_date, DateLocale},
    ArticleListController, HttpArticleQueryService, SortMode, StaticSession, UrlNavigation,
};
use clap::{Parser, Subcommand};
use shared::{domain::LoginOrigin, protocol::Article};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse articles from the command line")]
struct Args {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    /// GITHUB, STACKOVERFLOW or any other provider name.
    #[arg(long)]
    login_origin: Option<String>,
    /// Location the list starts from; its `sortBy`/`tag` params pick the view.
    #[arg(long)]
    start_url: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    locale: Option<DateLocale>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published articles.
    List {
        #[arg(long)]
        sort: Option<SortMode>,
        #[arg(long)]
        tag: Option<String>,
        /// Pages to load, including the first.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Print the tag vocabulary.
    Tags,
    /// List the session's drafts.
    Drafts,
    /// Filter the loaded list by title, tag or author.
    Search { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings()?;
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.token {
        settings.token = Some(v);
    }
    if let Some(v) = args.login_origin {
        settings.login_origin = Some(v);
    }
    if let Some(v) = args.start_url {
        settings.start_url = v;
    }
    if let Some(v) = args.limit {
        settings.page_items_limit = v;
    }
    if let Some(v) = args.locale {
        settings.date_locale = v;
    }

    let session = StaticSession::new(
        settings.token.clone(),
        settings.login_origin.as_deref().map(LoginOrigin::from),
    );
    let service = HttpArticleQueryService::new(&settings.api_url, Arc::new(session))
        .with_context(|| format!("invalid api url '{}'", settings.api_url))?;
    info!(api_url = %service.api_url(), "using article api");
    let navigation = UrlNavigation::new(&settings.start_url)
        .with_context(|| format!("invalid start url '{}'", settings.start_url))?;

    let mut controller = ArticleListController::new(Arc::new(service), Box::new(navigation))
        .with_page_items_limit(settings.page_items_limit);
    controller.mount();
    controller.settle().await;

    match args.command.unwrap_or(Command::List {
        sort: None,
        tag: None,
        pages: 1,
    }) {
        Command::List { sort, tag, pages } => {
            if let Some(tag) = tag {
                controller.select_tag(&tag);
            } else if let Some(sort) = sort {
                controller.select_sort(sort);
            }
            controller.settle().await;
            for _ in 1..pages {
                controller.load_more();
                controller.settle().await;
            }
        }
        Command::Tags => {
            for tag in controller.tags() {
                println!("{}", tag.name);
            }
            controller.unmount();
            return Ok(());
        }
        Command::Drafts => {
            controller.show_drafts();
            controller.settle().await;
        }
        Command::Search { key } => controller.search(&key),
    }
    controller.settle().await;

    if let Some(message) = &controller.state().error_message {
        eprintln!("{message}");
    }
    println!("# {}", controller.navigation().current_url());
    for article in controller.articles() {
        print_card(article, settings.date_locale);
    }
    if controller.state().has_more {
        println!("(more available)");
    }

    controller.unmount();
    Ok(())
}

fn print_card(article: &Article, locale: DateLocale) {
    let author = article
        .author
        .as_ref()
        .map(|a| a.full_name.as_str())
        .unwrap_or("unknown author");
    let date = article
        .published_at
        .or(article.last_saved_at)
        .map(|ts| format_date(&ts, locale))
        .unwrap_or_default();
    let minutes = article.reading_time.unwrap_or(1);

    println!("{} [{}]", article.title, article.id.0);
    println!("  {author} · {date} · {minutes} min read");
    if !article.tags.is_empty() {
        let names: Vec<&str> = article.tags.iter().map(|t| t.name.as_str()).collect();
        println!("  #{}", names.join(" #"));
    }
    if let Some(summary) = &article.summary {
        println!("  {summary}");
    }
}
