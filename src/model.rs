use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::duration::Duration;

/// Placeholder for a recipe without a publication date.
pub const UNSET_DATE: NaiveDate = NaiveDate::MIN;

/// Dates in or before this year count as "not set".
pub const LAST_UNSET_YEAR: i32 = 1900;

/// Who gets credit for a recipe. A recipe has an author or a publisher, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribution {
    Author(String),
    Publisher { name: String, url: Option<Url> },
}

/// Canonical, renderer-agnostic recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeModel {
    pub name: String,
    pub description: Option<String>,
    pub in_language: Option<String>,
    pub image: Option<String>,
    pub attribution: Option<Attribution>,
    pub date_published: NaiveDate,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub cooking_method: Option<String>,
    pub prep_time: Duration,
    pub cook_time: Duration,
    pub total_time: Duration,
    pub recipe_yield: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Raw, case-folded keywords; may contain duplicates
    pub keywords: Vec<String>,

    // Assigned by the loader
    pub source_file: PathBuf,
    pub output_filename: String,
    pub epub_id: String,
}

impl RecipeModel {
    pub fn new(name: impl Into<String>) -> Self {
        RecipeModel {
            name: name.into(),
            description: None,
            in_language: None,
            image: None,
            attribution: None,
            date_published: UNSET_DATE,
            category: None,
            cuisine: None,
            cooking_method: None,
            prep_time: Duration::ZERO,
            cook_time: Duration::ZERO,
            total_time: Duration::ZERO,
            recipe_yield: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            keywords: Vec::new(),
            source_file: PathBuf::new(),
            output_filename: String::new(),
            epub_id: String::new(),
        }
    }

    pub fn author(&self) -> Option<&str> {
        match &self.attribution {
            Some(Attribution::Author(name)) => Some(name),
            _ => None,
        }
    }

    pub fn publisher(&self) -> Option<&str> {
        match &self.attribution {
            Some(Attribution::Publisher { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn published_url(&self) -> Option<&Url> {
        match &self.attribution {
            Some(Attribution::Publisher { url, .. }) => url.as_ref(),
            _ => None,
        }
    }

    /// The publication date, or `None` when it is the sentinel or any year up to 1900.
    pub fn published_on(&self) -> Option<NaiveDate> {
        is_date_set(self.date_published).then_some(self.date_published)
    }
}

pub fn is_date_set(date: NaiveDate) -> bool {
    date.year() > LAST_UNSET_YEAR
}

/// A free-form Markdown page rendered alongside the recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub source_file: PathBuf,
    pub output_filename: String,
    pub html: String,
    pub epub_id: String,
}

/// A keyword with every recipe that carries it.
///
/// Keywords are identified by their case-folded name; `recipes` keeps
/// insertion order and never holds the same recipe twice.
#[derive(Debug, Clone)]
pub struct Keyword<'a> {
    pub name: String,
    pub recipes: Vec<&'a RecipeModel>,
}

impl<'a> Keyword<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Keyword {
            name: name.into(),
            recipes: Vec::new(),
        }
    }

    /// Add `recipe` unless this exact recipe is already listed.
    /// Returns whether it was added.
    pub fn add_recipe(&mut self, recipe: &'a RecipeModel) -> bool {
        if self.contains(recipe) {
            return false;
        }
        self.recipes.push(recipe);
        true
    }

    pub fn contains(&self, recipe: &RecipeModel) -> bool {
        self.recipes.iter().any(|r| std::ptr::eq(*r, recipe))
    }
}

impl PartialEq for Keyword<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Keyword<'_> {}

impl std::hash::Hash for Keyword<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
