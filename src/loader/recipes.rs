use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::{debug, error, info, warn};
use serde_json::Value;

use super::discover;
use crate::error::PublishError;
use crate::model::RecipeModel;
use crate::normalizer::{find_recipe_node, normalize, SourceRecipe};

/// Parse and normalize the JSON-LD recipe in `text`, read from `path`
pub fn parse_recipe(text: &str, path: &Path) -> Result<RecipeModel, PublishError> {
    let parse_error = |source| PublishError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let document: Value = serde_json::from_str(text).map_err(parse_error)?;

    let origin = path.display().to_string();
    let node = find_recipe_node(&document).ok_or_else(|| PublishError::Validation {
        origin: origin.clone(),
        reason: "no Recipe object found".to_string(),
    })?;

    let source = SourceRecipe::try_from(node).map_err(parse_error)?;
    let mut recipe = normalize(source, &origin)?;
    recipe.source_file = path.to_path_buf();

    Ok(recipe)
}

pub fn read_recipe_file(path: &Path) -> Result<RecipeModel, PublishError> {
    let text = fs::read_to_string(path).map_err(|e| PublishError::io(path, e))?;
    parse_recipe(&text, path)
}

/// Read every `*.json` recipe below `dir`, in discovery order.
///
/// Files that cannot be read, parsed or validated are logged and skipped.
pub fn read_recipes(dir: &Path) -> Result<Vec<RecipeModel>, PublishError> {
    info!("Reading recipes from {}", dir.display());

    let files = discover(dir, "json")?;
    let mut recipes = Vec::with_capacity(files.len());

    for path in files {
        match read_recipe_file(&path) {
            Ok(recipe) => {
                debug!("Loaded '{}' from {}", recipe.name, path.display());
                recipes.push(recipe);
            }
            Err(e @ PublishError::Validation { .. }) => warn!("Skipping recipe: {e}"),
            Err(e) => error!("Skipping recipe: {e}"),
        }
    }

    if recipes.is_empty() {
        info!("No recipes found in {}", dir.display());
    }

    Ok(recipes)
}
