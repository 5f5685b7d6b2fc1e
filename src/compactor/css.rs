//! Stylesheet compactor.
//!
//! Parses with lightningcss, rewrites local `url(...)` references to hashed
//! names, and prints (minified unless disabled). The hash covers the raw
//! source bytes followed by the hashed path of every rewritten reference,
//! so a changed image renames every sheet that points at it.

use super::Compactor;
use crate::build::BuildManager;
use crate::link::LinkRewriter;
use crate::log;
use crate::utils::hash::ContentDigest;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::visitor::Visit;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy)]
pub struct CssCompactor {
    minify: bool,
}

/// Printed sheet plus the hashed paths its links now point at.
struct Rewritten {
    code: String,
    links: Vec<String>,
}

impl CssCompactor {
    pub const fn new(minify: bool) -> Self {
        Self { minify }
    }

    /// Parse, rewrite and print. `None` if the sheet does not parse.
    ///
    /// Rules or declarations the parser rejects are dropped and the rest of
    /// the sheet is still rewritten. With `report` unset, parse problems and
    /// missing references are not logged (they were reported while hashing).
    fn rewrite(
        &self,
        manager: &mut BuildManager,
        path: &str,
        text: &str,
        report: bool,
    ) -> Option<Rewritten> {
        let warnings = Arc::new(RwLock::new(Vec::new()));
        let options = ParserOptions {
            filename: path.to_string(),
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        };
        let mut stylesheet = match StyleSheet::parse(text, options) {
            Ok(stylesheet) => stylesheet,
            Err(err) => {
                if report {
                    log!("warning"; "{} could not be parsed ({}), copying as-is", path, err);
                }
                return None;
            }
        };
        if report && let Ok(warnings) = warnings.read() {
            for warning in warnings.iter() {
                log!("warning"; "{}: skipped invalid css ({})", path, warning);
            }
        }

        let mut rewriter = LinkRewriter::new(manager, path).quiet(!report);
        match stylesheet.visit(&mut rewriter) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        let links = rewriter.into_resolved();

        let printed = stylesheet
            .to_css(PrinterOptions {
                minify: self.minify,
                ..PrinterOptions::default()
            })
            .ok()?;
        Some(Rewritten {
            code: printed.code,
            links,
        })
    }
}

impl Compactor for CssCompactor {
    fn source_extensions(&self) -> Vec<String> {
        vec![".css".to_string()]
    }

    fn target_extension(&self, _manager: &BuildManager, _path: &str) -> String {
        ".css".to_string()
    }

    fn calc_hash(
        &self,
        manager: &mut BuildManager,
        digest: &mut ContentDigest,
        path: &str,
        source: &Path,
    ) -> io::Result<()> {
        let bytes = fs::read(source)?;
        digest.update(&bytes);
        if let Some(rewritten) = self.rewrite(manager, path, &String::from_utf8_lossy(&bytes), true) {
            for link in &rewritten.links {
                digest.update_str(link);
            }
        }
        Ok(())
    }

    fn compact(
        &self,
        manager: &mut BuildManager,
        path: &str,
        source: &Path,
        target: &Path,
    ) -> io::Result<()> {
        let bytes = fs::read(source)?;
        match self.rewrite(manager, path, &String::from_utf8_lossy(&bytes), false) {
            Some(rewritten) => fs::write(target, rewritten.code),
            None => fs::write(target, &bytes),
        }
    }
}
