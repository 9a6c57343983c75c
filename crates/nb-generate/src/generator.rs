//! Incremental fetch-render pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use nb_cache::{Cache, CacheExt};
use nb_config::{Config, Dirs};
use nb_renderer::Renderer;
use nb_site::{
    ContentTree, LinkResolver, PageMetadata, SiteModel, build_site_model,
    page_id_from_collection_url, render_content,
};
use nb_source::ContentSource;
use serde_json::Value;
use tracing::Instrument;

use crate::assets::copy_theme_assets;
use crate::error::{GenerateError, PageError};
use crate::pool::WorkerPool;
use crate::report::{GenerateReport, PageStatus};
use crate::site::{post_view, render_site_pages};

/// Cache namespace of page content trees.
pub const CONTENT_NAMESPACE: &str = "content";

/// Settings of one run.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub dirs: Dirs,
    /// Page URL of the remote table.
    pub table_url: String,
    pub concurrency: usize,
    /// Fetch every page regardless of the cache.
    pub ignore_cache: bool,
}

impl GenerateOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            dirs: config.dirs.clone(),
            table_url: config.url.clone(),
            concurrency: config.concurrency,
            ignore_cache: config.ignore_cache,
        }
    }
}

/// Pages split by whether their content must be fetched.
///
/// Holds indices into [`SiteModel::pages`]; every page is in exactly one half.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub updated: Vec<usize>,
    pub not_updated: Vec<usize>,
}

impl Partition {
    /// Ask the cache which pages changed since they were last stored.
    pub fn compute(model: &SiteModel, cache: &dyn Cache, ignore_cache: bool) -> Self {
        let mut partition = Self::default();
        for (index, page) in model.pages.iter().enumerate() {
            if ignore_cache
                || cache.should_update(CONTENT_NAMESPACE, &page.dash_id(), page.last_edited())
            {
                partition.updated.push(index);
            } else {
                partition.not_updated.push(index);
            }
        }
        partition
    }

    /// Page indices in scheduling order, each with whether it must be fetched.
    pub fn schedule(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.updated
            .iter()
            .map(|&index| (index, true))
            .chain(self.not_updated.iter().map(|&index| (index, false)))
    }
}

/// Drives a `generate` run.
///
/// The content source and renderer are shared by every page task.
pub struct Generator<S, R> {
    options: GenerateOptions,
    source: Arc<S>,
    renderer: Arc<R>,
    cache: Arc<dyn Cache>,
}

/// State shared read-only by all page tasks of a run.
struct PageContext<S, R> {
    model: Arc<SiteModel>,
    site: Value,
    resolver: LinkResolver,
    source: Arc<S>,
    renderer: Arc<R>,
    cache: Arc<dyn Cache>,
    out_dir: PathBuf,
}

impl<S, R> Generator<S, R>
where
    S: ContentSource + 'static,
    R: Renderer + 'static,
{
    pub fn new(
        options: GenerateOptions,
        source: Arc<S>,
        renderer: Arc<R>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            options,
            source,
            renderer,
            cache,
        }
    }

    /// Fetch the site table and render every page.
    ///
    /// Page failures are collected in the report; only problems that make
    /// the whole site unusable are returned as errors, and those happen
    /// before any page task starts.
    pub async fn generate(&self) -> Result<GenerateReport, GenerateError> {
        let dirs = &self.options.dirs;
        if !dirs.theme_dir.is_dir() {
            return Err(GenerateError::ThemeNotFound(dirs.theme_dir.clone()));
        }
        for dir in [&dirs.out_dir, &dirs.tag_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| GenerateError::Io {
                    path: dir.clone(),
                    source,
                })?;
        }

        tracing::info!("Copy theme assets");
        copy_theme_assets(&dirs.assets_dir(), &dirs.out_dir).map_err(|source| {
            GenerateError::Io {
                path: dirs.assets_dir(),
                source,
            }
        })?;

        tracing::info!("Fetch site metadata");
        let table_id = page_id_from_collection_url(&self.options.table_url)?;
        let table = self.source.fetch_table(&table_id).await?;
        let model = Arc::new(build_site_model(&table)?);
        let site = serde_json::to_value(&*model)?;

        tracing::info!("Render site entry");
        render_site_pages(
            self.renderer.as_ref(),
            &model,
            &site,
            &dirs.index_path(),
            &dirs.tag_dir,
        )
        .await?;

        let partition = Partition::compute(&model, self.cache.as_ref(), self.options.ignore_cache);
        let mut report = GenerateReport {
            total: model.pages.len(),
            updated: partition.updated.len(),
            published: model.published_count(),
            ..GenerateReport::default()
        };
        tracing::info!(
            "{} of {} posts have been updated",
            report.updated,
            report.total
        );
        tracing::info!(
            "{} of {} posts are published",
            report.published,
            report.total
        );

        let context = Arc::new(PageContext {
            resolver: LinkResolver::new(&model),
            model: Arc::clone(&model),
            site,
            source: Arc::clone(&self.source),
            renderer: Arc::clone(&self.renderer),
            cache: Arc::clone(&self.cache),
            out_dir: dirs.out_dir.clone(),
        });

        tracing::info!("Fetch and render pages");
        let schedule: Vec<(usize, bool)> = partition.schedule().collect();
        let jobs = schedule.iter().map(|&(index, fetch)| {
            let context = Arc::clone(&context);
            let span = tracing::info_span!("page", id = %model.pages[index].id);
            async move { render_page(&context, index, fetch).await }.instrument(span)
        });
        let results = WorkerPool::new(self.options.concurrency).run(jobs).await;

        for (job, result) in results {
            let page = &model.pages[schedule[job].0];
            let outcome = match result {
                Ok(Ok(status)) => Ok(status),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(PageError::Task(e)),
            };
            if let Err(e) = &outcome {
                tracing::error!(page = %page.id, error = %e, "Page failed");
            }
            report.record(&page.id, outcome.map_err(|e| e.to_string()));
        }
        Ok(report)
    }
}

/// Fetch or load one page, then render it if it is published.
async fn render_page<S, R>(
    context: &PageContext<S, R>,
    index: usize,
    fetch: bool,
) -> Result<PageStatus, PageError>
where
    S: ContentSource + 'static,
    R: Renderer + 'static,
{
    let page = &context.model.pages[index];
    let tree = if fetch {
        fetch_content(context, page).await?
    } else {
        load_content(context, page).await?
    };

    if !page.publish {
        tracing::info!("Skip rendering of unpublished page");
        return Ok(PageStatus::Skipped);
    }

    tracing::info!(url = %page.url, "Render page");
    let view = post_view(&context.site, page, render_content(&tree))?;
    let html = context.renderer.render(&page.template, &view)?;
    let path = context.out_dir.join(&page.url);
    tokio::fs::write(&path, html)
        .await
        .map_err(|source| PageError::Write { path, source })?;
    Ok(PageStatus::Rendered)
}

async fn fetch_content<S, R>(
    context: &PageContext<S, R>,
    page: &PageMetadata,
) -> Result<ContentTree, PageError>
where
    S: ContentSource,
{
    let id = page.dash_id();
    tracing::info!("Fetch page");
    let mut tree = context.source.fetch_page(&id).await?;
    let rewrites = context.resolver.resolve(&mut tree);
    tracing::debug!(rewrites, "Resolved internal links");

    let cache = Arc::clone(&context.cache);
    let tree = tokio::task::spawn_blocking(move || {
        cache
            .set_json(CONTENT_NAMESPACE, &id, &tree)
            .map(|()| tree)
    })
    .await??;
    tracing::info!("Cache saved");
    Ok(tree)
}

async fn load_content<S, R>(
    context: &PageContext<S, R>,
    page: &PageMetadata,
) -> Result<ContentTree, PageError> {
    let id = page.dash_id();
    tracing::info!("Read cache of page");
    let cache = Arc::clone(&context.cache);
    let cached = tokio::task::spawn_blocking(move || {
        cache.get_json::<ContentTree>(CONTENT_NAMESPACE, &id)
    })
    .await?;

    cached
        .filter(|tree| tree.validate().is_ok())
        .ok_or_else(|| PageError::CacheCorrupted {
            page_id: page.dash_id(),
        })
}
