//! Publish a folder of schema.org recipes as a static website and an EPUB book.
//!
//! Recipes are read from JSON-LD files, normalized into [`RecipeModel`]s,
//! indexed by keyword and handed to each enabled [`renderers::Renderer`].

pub mod config;
pub mod duration;
pub mod error;
pub mod indexer;
pub mod loader;
pub mod model;
pub mod normalizer;
pub mod renderers;

use log::info;

pub use config::AppSettings;
pub use duration::Duration;
pub use error::PublishError;
pub use indexer::{build_index, index_words, KeywordRegistry};
pub use loader::Corpus;
pub use model::{Attribution, Document, Keyword, RecipeModel};
pub use normalizer::{normalize, SourceRecipe};

/// What a publishing run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No recipes were found, so nothing was written
    EmptyCorpus,
    Published {
        recipes: usize,
        documents: usize,
        keywords: usize,
    },
}

/// Load, index and render everything described by `settings`.
///
/// Returns early with [`RunOutcome::EmptyCorpus`] when there are no recipes.
/// The first renderer error aborts the run.
pub fn run(settings: &AppSettings) -> Result<RunOutcome, PublishError> {
    let corpus = Corpus::load(&settings.input_paths)?;
    if corpus.is_empty() {
        info!("No recipes found, nothing to publish");
        return Ok(RunOutcome::EmptyCorpus);
    }

    let keywords = build_index(&corpus.recipes);
    info!("Indexed {} keywords", keywords.len());

    for renderer in renderers::enabled_renderers(settings) {
        info!("Rendering {}", renderer.name());
        renderer.render(&corpus, &keywords)?;
    }

    Ok(RunOutcome::Published {
        recipes: corpus.recipes.len(),
        documents: corpus.documents.len(),
        keywords: keywords.len(),
    })
}
