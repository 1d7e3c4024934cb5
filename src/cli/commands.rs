use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::{IngestReport, Result, ScrapeSession};
use crate::capture::{FileCaptureReader, ParallelLoader};
use crate::config::{Config, ScrapeConfig};
use crate::domain::PostStub;
use crate::normalizer::{Normalizer, QueryKind};
use crate::store::Store;

/// Options for `groupfeed export`.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub output: Option<PathBuf>,
    pub stubs: Option<PathBuf>,
    pub max_posts: Option<usize>,
    pub resume: Option<PathBuf>,
}

fn open_session(scrape: ScrapeConfig, resume: Option<&Path>) -> Result<ScrapeSession> {
    match resume {
        Some(path) => {
            let session = ScrapeSession::resumable(path, scrape)?;
            println!(
                "Resuming from {} ({} posts, {} comments)",
                path.display(),
                session.store().post_count()?,
                session.store().comment_count()?
            );
            Ok(session)
        }
        None => Ok(ScrapeSession::in_memory(scrape)),
    }
}

async fn load_captures(config: &Config, captures: Vec<PathBuf>, session: Arc<ScrapeSession>) -> IngestReport {
    let reader = Arc::new(FileCaptureReader::new(config.markers.clone()));
    let loader = ParallelLoader::with_workers(reader, config.scrape.workers);

    let mut total = IngestReport::default();
    for (path, result) in loader.ingest_all(captures, session).await {
        match result {
            Ok(report) => total.merge(report),
            Err(e) => eprintln!("  Error reading {}: {}", path.display(), e),
        }
    }
    total
}

pub async fn export(config: &Config, captures: Vec<PathBuf>, options: ExportOptions) -> Result<()> {
    let mut scrape = config.scrape.clone();
    if let Some(max_posts) = options.max_posts {
        scrape.max_posts = max_posts;
    }
    let output = options.output.unwrap_or_else(|| scrape.output.clone());

    let session = Arc::new(open_session(scrape, options.resume.as_deref())?);

    println!("Reading {} capture files...", captures.len());
    let report = load_captures(config, captures, session.clone()).await;

    let mut stub_posts = 0;
    if let Some(path) = options.stubs {
        let content = std::fs::read_to_string(&path)?;
        let stubs: Vec<PostStub> = serde_json::from_str(&content)?;
        stub_posts = session.ingest_stubs(stubs)?;
    }

    let rows = session.export_csv(&output)?;

    println!(
        "Added {} posts, {} comments, {} page stubs ({} units skipped)",
        report.posts_added, report.comments_added, stub_posts, report.units_skipped
    );
    if report.capped {
        println!("Post limit of {} reached", session.config().max_posts);
    }
    println!("Wrote {} rows to {}", rows, output.display());
    Ok(())
}

pub async fn inspect(config: &Config, captures: Vec<PathBuf>, json: bool) -> Result<()> {
    let scrape = ScrapeConfig {
        max_posts: 0,
        ..config.scrape.clone()
    };
    let session = Arc::new(ScrapeSession::in_memory(scrape));
    let report = load_captures(config, captures, session.clone()).await;

    let store = session.store();
    if json {
        for row in store.flatten()? {
            println!("{}", serde_json::to_string(&row)?);
        }
        return Ok(());
    }

    for post in store.posts()? {
        println!(
            "post {}  {}  {}",
            post.post_id,
            post.author.name.as_deref().unwrap_or("(unknown)"),
            preview(&post.text)
        );
    }
    for comment in store.comments()? {
        println!(
            "  comment {} on {}  {}  {}",
            comment.comment_id,
            comment.post_id,
            comment.author_name.as_deref().unwrap_or("(unknown)"),
            preview(comment.text.as_deref().unwrap_or(""))
        );
    }

    println!(
        "{} posts, {} comments, {} units skipped",
        report.posts_added, report.comments_added, report.units_skipped
    );
    Ok(())
}

pub fn parse(config: &Config, kind: QueryKind, body: &Path, post_id: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(body)?;
    let normalizer = if config.scrape.deep_search {
        Normalizer::new()
    } else {
        Normalizer::without_deep_search()
    };

    let normalized = normalizer.normalize_body(kind, &content, post_id);
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

/// First line of `text`, cut to 60 characters.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > 60 {
        format!("{}...", line.chars().take(57).collect::<String>())
    } else {
        line.to_string()
    }
}
