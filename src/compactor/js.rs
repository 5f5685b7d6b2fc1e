//! Script compactor.
//!
//! Uses oxc to minify; hashes the raw source bytes. Files named `*.min.js`
//! and scripts oxc cannot parse are copied as-is.

use super::{Compactor, copy_file, hash_file};
use crate::build::BuildManager;
use crate::log;
use crate::utils::hash::ContentDigest;
use crate::utils::path::file_name;
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct JsCompactor {
    minify: bool,
}

impl JsCompactor {
    pub const fn new(minify: bool) -> Self {
        Self { minify }
    }
}

impl Compactor for JsCompactor {
    fn source_extensions(&self) -> Vec<String> {
        vec![".js".to_string()]
    }

    fn target_extension(&self, _manager: &BuildManager, _path: &str) -> String {
        ".js".to_string()
    }

    fn calc_hash(
        &self,
        _manager: &mut BuildManager,
        digest: &mut ContentDigest,
        _path: &str,
        source: &Path,
    ) -> io::Result<()> {
        hash_file(digest, source)
    }

    fn compact(
        &self,
        _manager: &mut BuildManager,
        path: &str,
        source: &Path,
        target: &Path,
    ) -> io::Result<()> {
        if !self.minify || is_preminified(path) {
            return copy_file(source, target);
        }

        let Ok(code) = String::from_utf8(fs::read(source)?) else {
            log!("warning"; "{} is not valid UTF-8, copying as-is", path);
            return copy_file(source, target);
        };
        match minify_js(&code) {
            Some(minified) => fs::write(target, minified),
            None => {
                log!("warning"; "{} could not be parsed, copying as-is", path);
                fs::write(target, code)
            }
        }
    }
}

/// `foo.min.js` is already minified.
fn is_preminified(path: &str) -> bool {
    file_name(path).to_ascii_lowercase().ends_with(".min.js")
}

/// Minify a classic browser script.
///
/// Top-level declarations are globals shared with other scripts, so they
/// are kept and never renamed.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if !ret.errors.is_empty() || ret.panicked {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}
