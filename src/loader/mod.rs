//! Turns the source directories into a sorted, identified [`Corpus`].

mod documents;
mod recipes;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{info, warn};

use crate::config::InputPaths;
use crate::error::PublishError;
use crate::model::{Document, RecipeModel};

pub use documents::{markdown_to_document, read_document_file, read_documents};
pub use recipes::{parse_recipe, read_recipe_file, read_recipes};

/// Output file names the renderers write themselves
pub const RESERVED_FILENAMES: [&str; 4] = [
    "index.html",
    "keywords.html",
    "coverpage.html",
    "indexpage.html",
];

/// Everything the renderers get: recipes sorted by name and documents, all
/// carrying a unique output filename and EPUB id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub recipes: Vec<RecipeModel>,
    pub documents: Vec<Document>,
}

impl Corpus {
    /// Sort the recipes by name and assign output filenames and EPUB ids.
    ///
    /// Recipes get `recipe1`, `recipe2`, ... in sorted order, documents get
    /// `doc1`, `doc2`, ... in the order given. Equal names keep their
    /// relative order.
    pub fn new(mut recipes: Vec<RecipeModel>, mut documents: Vec<Document>) -> Self {
        recipes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut filenames = FilenameAllocator::new();

        for (i, recipe) in recipes.iter_mut().enumerate() {
            recipe.output_filename = filenames.allocate(&recipe.source_file);
            recipe.epub_id = format!("recipe{}", i + 1);
        }

        for (i, document) in documents.iter_mut().enumerate() {
            document.output_filename = filenames.allocate(&document.source_file);
            document.epub_id = format!("doc{}", i + 1);
        }

        Corpus { recipes, documents }
    }

    /// Load recipes and, when there are any, documents.
    ///
    /// Only an unreadable recipe directory (or an unreadable configured
    /// document directory) is an error; bad individual files are skipped.
    pub fn load(paths: &InputPaths) -> Result<Self, PublishError> {
        let recipes = read_recipes(&paths.recipes)?;
        if recipes.is_empty() {
            return Ok(Corpus::default());
        }

        let documents = match &paths.documents {
            Some(dir) if dir.exists() => read_documents(dir)?,
            Some(dir) => {
                info!("No document directory at {}", dir.display());
                Vec::new()
            }
            None => Vec::new(),
        };

        let corpus = Corpus::new(recipes, documents);
        info!(
            "Loaded {} recipes and {} documents",
            corpus.recipes.len(),
            corpus.documents.len()
        );
        Ok(corpus)
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// `dir/sub/Apple Pie.json` becomes `Apple Pie.html`
pub fn output_filename(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.html")
}

/// Hands out output filenames, suffixing `-2`, `-3`, ... on collisions.
#[derive(Debug)]
struct FilenameAllocator {
    used: HashSet<String>,
}

impl FilenameAllocator {
    fn new() -> Self {
        FilenameAllocator {
            used: RESERVED_FILENAMES.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn allocate(&mut self, source: &Path) -> String {
        let wanted = output_filename(source);
        if self.used.insert(wanted.clone()) {
            return wanted;
        }

        let stem = wanted.trim_end_matches(".html");
        let mut n = 2;
        loop {
            let candidate = format!("{stem}-{n}.html");
            if self.used.insert(candidate.clone()) {
                warn!(
                    "Output file {wanted} already taken, writing {} as {candidate}",
                    source.display()
                );
                return candidate;
            }
            n += 1;
        }
    }
}

/// All files below `dir` with the given extension, in sorted path order.
///
/// Fails only when `dir` itself cannot be read.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PublishError> {
    discover_files(dir, &format!("*.{extension}"))
}

/// All files below `dir` whose name matches the glob `name_pattern`
pub fn discover_files(dir: &Path, name_pattern: &str) -> Result<Vec<PathBuf>, PublishError> {
    fs::read_dir(dir).map_err(|e| PublishError::io(dir, e))?;

    let pattern = format!(
        "{}/**/{name_pattern}",
        Pattern::escape(&dir.to_string_lossy())
    );

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {e}"),
        }
    }
    files.sort();

    Ok(files)
}
