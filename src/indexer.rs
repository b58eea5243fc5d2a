//! Corpus-wide keyword index.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::model::{Keyword, RecipeModel};

/// Find-or-create store of keywords, keyed by their case-folded name
#[derive(Debug, Default)]
pub struct KeywordRegistry<'a> {
    keywords: HashMap<String, Keyword<'a>>,
}

impl<'a> KeywordRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the keyword called `name`, creating it when it is new
    pub fn find_or_create(&mut self, name: &str) -> &mut Keyword<'a> {
        self.keywords
            .entry(name.to_string())
            .or_insert_with(|| Keyword::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Keyword<'a>> {
        self.keywords.get(name)
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// All keywords, sorted by name
    pub fn into_sorted(self) -> Vec<Keyword<'a>> {
        let mut keywords: Vec<Keyword<'a>> = self.keywords.into_values().collect();
        keywords.sort_by(|a, b| a.name.cmp(&b.name));
        keywords
    }
}

fn fold(word: &str) -> Option<String> {
    let word = word.trim();
    (!word.is_empty()).then(|| word.to_lowercase())
}

/// The distinct index words of one recipe: its category, cuisine, cooking
/// method and raw keywords, case-folded and trimmed.
pub fn index_words(recipe: &RecipeModel) -> HashSet<String> {
    [&recipe.category, &recipe.cuisine, &recipe.cooking_method]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .chain(recipe.keywords.iter().map(String::as_str))
        .filter_map(fold)
        .collect()
}

/// Build the keyword index over `recipes`, sorted by keyword name.
///
/// Each keyword lists its recipes in corpus order, each recipe at most once
/// however many of its fields produced the word.
pub fn build_index(recipes: &[RecipeModel]) -> Vec<Keyword<'_>> {
    let mut registry = KeywordRegistry::new();

    for recipe in recipes {
        for word in index_words(recipe) {
            registry.find_or_create(&word).add_recipe(recipe);
        }
    }

    debug!(
        "Indexed {} keywords over {} recipes",
        registry.len(),
        recipes.len()
    );

    registry.into_sorted()
}
