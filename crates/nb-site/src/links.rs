//! Rewriting of source-internal references to output urls.
//!
//! Three reference shapes are handled on every node below the root:
//! page-reference blocks, inline page mentions and inline link marks whose
//! target is a source-internal path (`/pageid` or `/pageid#blockid`).

use std::collections::HashMap;

use crate::content::{BlockKind, ContentTree, Node, NodeId, Visit};
use crate::id::{SOURCE_ORIGIN, is_page_id, page_id_from_uri, to_plain_id};
use crate::model::SiteModel;
use crate::rich_text::{Mark, RichText};

/// Resolves page references against a site model.
#[derive(Clone, Debug, Default)]
pub struct LinkResolver {
    /// Dashless page id to output url.
    urls: HashMap<String, String>,
}

impl LinkResolver {
    #[must_use]
    pub fn new(model: &SiteModel) -> Self {
        let urls = model
            .pages
            .iter()
            .map(|page| (to_plain_id(&page.id), page.url.clone()))
            .collect();
        Self { urls }
    }

    /// Output url of a page id in either spelling.
    #[must_use]
    pub fn url_of(&self, page_id: &str) -> Option<&str> {
        self.urls.get(&to_plain_id(page_id)).map(String::as_str)
    }

    /// Rewrite every reference in `tree` and return the number of rewrites.
    ///
    /// Running it again on a resolved tree rewrites nothing.
    pub fn resolve(&self, tree: &mut ContentTree) -> usize {
        let mut rewrites = 0;
        tree.walk_mut(|node, parent| self.resolve_node(node, parent, &mut rewrites));
        rewrites
    }

    /// Rewrite the references held by one node.
    ///
    /// The root (`parent == None`) is left alone.
    pub fn resolve_node(
        &self,
        node: &mut Node,
        parent: Option<NodeId>,
        rewrites: &mut usize,
    ) -> Visit {
        if parent.is_none() {
            return Visit::Continue;
        }

        if node.kind == BlockKind::Page {
            if let Some(uri) = node.uri.as_mut()
                && let Some(url) = self.page_url(uri)
            {
                replace(uri, url.to_owned(), rewrites);
            }
            return Visit::Continue;
        }

        for run in &mut node.title {
            self.resolve_run(run, rewrites);
        }
        Visit::Continue
    }

    fn resolve_run(&self, run: &mut RichText, rewrites: &mut usize) {
        if run.is_page_mention() {
            if let Some(Mark::PageMention { uri }) = run.marks.first_mut() {
                let id = page_id_from_uri(uri);
                if is_page_id(id) {
                    let target = self
                        .url_of(id)
                        .map_or_else(|| format!("{SOURCE_ORIGIN}/{id}"), str::to_owned);
                    replace(uri, target, rewrites);
                }
            }
            return;
        }

        for mark in &mut run.marks {
            if let Mark::Link { href } = mark
                && let Some(target) = self.link_target(href)
            {
                replace(href, target, rewrites);
            }
        }
    }

    /// Output url for a page-reference uri, if the page is in the site.
    fn page_url(&self, uri: &str) -> Option<&str> {
        let id = page_id_from_uri(uri);
        if is_page_id(id) { self.url_of(id) } else { None }
    }

    /// New target of a link mark, or `None` for external links.
    fn link_target(&self, href: &str) -> Option<String> {
        if !href.starts_with('/') {
            return None;
        }
        // Collection views open pages in preview mode, which has no static
        // counterpart.
        if href.contains('?') {
            return Some(format!("{SOURCE_ORIGIN}{href}"));
        }

        let path = href.replace('/', "");
        let (page, block) = match path.split_once('#') {
            Some((page, block)) => (page, Some(block)),
            None => (path.as_str(), None),
        };
        let target = match (self.url_of(page), block) {
            (Some(url), Some(block)) => format!("{url}#{}", to_plain_id(block)),
            (Some(url), None) => url.to_owned(),
            (None, _) => format!("{SOURCE_ORIGIN}{href}"),
        };
        Some(target)
    }
}

fn replace(slot: &mut String, target: String, rewrites: &mut usize) {
    if *slot != target {
        tracing::debug!(from = %slot, to = %target, "Replace link");
        *slot = target;
        *rewrites += 1;
    }
}
