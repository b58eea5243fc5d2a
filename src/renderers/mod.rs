//! Output formats. Each renderer reads the corpus and the keyword index and
//! writes its own files; none of them touch the models.

pub mod epub;
pub mod html;
pub mod markup;

use std::fs;
use std::path::Path;

use log::debug;

use crate::config::AppSettings;
use crate::error::PublishError;
use crate::loader::Corpus;
use crate::model::Keyword;

pub use epub::EpubBook;
pub use html::HtmlSite;

pub trait Renderer {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    fn render(&self, corpus: &Corpus, keywords: &[Keyword<'_>]) -> Result<(), PublishError>;
}

/// The enabled renderers, in the order they run
pub fn enabled_renderers(settings: &AppSettings) -> Vec<Box<dyn Renderer>> {
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    if settings.website.enabled {
        renderers.push(Box::new(HtmlSite::new(settings.clone())));
    }
    if settings.epub.enabled {
        renderers.push(Box::new(EpubBook::new(settings.clone())));
    }
    renderers
}

/// Write `contents` to `path`, creating parent directories as needed
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), PublishError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
    }
    debug!("Writing {}", path.display());
    fs::write(path, contents).map_err(|e| PublishError::io(path, e))
}
