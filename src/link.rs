//! Stylesheet link rewriting.
//!
//! Every local `url(...)` in a stylesheet is resolved against the sheet's
//! logical path, built on demand, and replaced by the bare file name of its
//! hashed output. Hashed outputs share one directory, so the bare name
//! resolves relative to the rewritten sheet.
//!
//! ```text
//! /css/site.css:  url(../img/bg.png?v=2)
//!              -> /img/bg.png       (child link recorded, resolved)
//!              -> /cdn/9f2c...e1.png
//!              -> url(9f2c...e1.png?v=2)
//! ```
//!
//! Links left untouched: external (`https:`, `//host`), `data:` URIs,
//! fragment-only references, and anything whose target cannot be built.

use crate::build::BuildManager;
use crate::utils::path::{file_name, is_external_link, resolve_link, split_suffix};
use crate::{debug, log};
use lightningcss::values::url::Url;
use lightningcss::visit_types;
use lightningcss::visitor::{VisitTypes, Visitor};
use std::convert::Infallible;

/// Rewrites local links of one stylesheet, recording what it resolved.
pub struct LinkRewriter<'m> {
    manager: &'m mut BuildManager,
    context: String,
    resolved: Vec<String>,
    quiet: bool,
}

impl<'m> LinkRewriter<'m> {
    /// Rewriter for links found in the resource at logical path `context`.
    pub fn new(manager: &'m mut BuildManager, context: &str) -> Self {
        Self {
            manager,
            context: context.to_string(),
            resolved: Vec::new(),
            quiet: false,
        }
    }

    /// Suppress missing-reference warnings (for a second pass over a sheet
    /// that was already reported).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Rewrite one link. `None` means leave it unchanged.
    pub fn rewrite(&mut self, link: &str) -> Option<String> {
        let link = link.trim();
        if link.is_empty() || is_external_link(link) {
            return None;
        }
        let (link_path, suffix) = split_suffix(link);
        if link_path.is_empty() {
            return None;
        }
        let resolved = resolve_link(&self.context, link_path)?;

        self.manager.add_child_link(&self.context, &resolved);
        self.manager.ensure_processed(&resolved);
        let Some(hashed) = self.manager.processed_path(&resolved) else {
            if !self.quiet {
                log!("warning"; "missing stylesheet reference: {} (in {})", resolved, self.context);
            }
            return None;
        };

        let rewritten = format!("{}{}", file_name(hashed), suffix);
        debug!("css"; "{}: {}{} -> {}", self.context, resolved, suffix, rewritten);
        self.resolved.push(hashed.to_string());
        Some(rewritten)
    }

    /// Hashed paths of every rewritten link, in document order.
    pub fn into_resolved(self) -> Vec<String> {
        self.resolved
    }
}

impl<'i> Visitor<'i> for LinkRewriter<'_> {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS)
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> Result<(), Self::Error> {
        if let Some(rewritten) = self.rewrite(&url.url) {
            url.url = rewritten.into();
        }
        Ok(())
    }
}
