//! Loosely-typed view of a schema.org `Recipe`.
//!
//! Almost every property may be missing, given once, or given as a list, and
//! many accept either plain text or a small object. These types accept all of
//! those shapes; the normalizer collapses them into [`crate::model::RecipeModel`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::convert::TryFrom;

/// An entry of a property that did not have any of the accepted shapes
#[derive(Debug, Clone)]
pub struct Rejected {
    pub value: Value,
    pub reason: String,
}

/// A property that may be missing, given once, or given as a list.
///
/// Entries of an unexpected shape (a number where text belongs, a `null` in
/// a list) are set aside in `rejected` so the rest of the recipe survives.
#[derive(Debug, Clone)]
pub struct Field<T> {
    values: Vec<T>,
    rejected: Vec<Rejected>,
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field {
            values: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T> Field<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn rejected(&self) -> &[Rejected] {
        &self.rejected
    }
}

impl<T: DeserializeOwned> Field<T> {
    pub fn from_value(value: Value) -> Self {
        let entries = match value {
            Value::Null => Vec::new(),
            Value::Array(entries) => entries,
            other => vec![other],
        };

        let mut field = Field::default();
        for entry in entries {
            if entry.is_null() {
                field.rejected.push(Rejected {
                    value: entry,
                    reason: "null entry".to_string(),
                });
                continue;
            }
            match T::deserialize(&entry) {
                Ok(parsed) => field.values.push(parsed),
                Err(e) => field.rejected.push(Rejected {
                    value: entry,
                    reason: e.to_string(),
                }),
            }
        }
        field
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Field::from_value)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextObject {
    #[serde(rename = "@value")]
    value: Option<String>,
    text: Option<String>,
    name: Option<String>,
}

/// Text, or an object carrying text (`{"@value": ..}`, `{"text": ..}`, a `DefinedTerm`, a `Language`)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    Object(TextObject),
}

impl Text {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Text::Plain(s) => Some(s),
            Text::Object(obj) => obj
                .value
                .as_deref()
                .or(obj.text.as_deref())
                .or(obj.name.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(rename = "@type", default)]
    pub kind: Field<String>,
    pub name: Option<String>,
}

/// An `author` or `publisher` value
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Party {
    Name(String),
    Entity(Entity),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantitativeValue {
    #[serde(default)]
    pub value: Field<Amount>,
    #[serde(rename = "unitText", default)]
    pub unit_text: Field<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YieldValue {
    Text(String),
    Number(f64),
    Quantity(QuantitativeValue),
}

#[derive(Debug, Clone, Deserialize)]
pub struct HowTo {
    #[serde(rename = "@type", default)]
    pub kind: Field<String>,
    pub text: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "itemListElement", default)]
    pub item_list_element: Field<Instruction>,
}

impl HowTo {
    /// A `HowToSection`, whose steps carry the content
    pub fn is_section(&self) -> bool {
        !self.item_list_element.is_empty()
            || self
                .kind
                .iter()
                .any(|kind| kind.eq_ignore_ascii_case("howtosection"))
    }
}

/// A plain instruction string, a `HowToStep`, or a `HowToSection` of steps
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Text(String),
    Step(HowTo),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageObject {
    pub url: Option<String>,
    #[serde(rename = "contentUrl")]
    pub content_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageValue {
    Url(String),
    Object(ImageObject),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourceRecipe {
    pub name: Field<Text>,
    pub description: Field<Text>,
    #[serde(rename = "inLanguage")]
    pub in_language: Field<Text>,
    pub image: Field<ImageValue>,
    pub author: Field<Party>,
    pub publisher: Field<Party>,
    pub url: Field<String>,
    #[serde(rename = "datePublished")]
    pub date_published: Field<String>,
    #[serde(rename = "recipeCategory")]
    pub recipe_category: Field<Text>,
    #[serde(rename = "recipeCuisine")]
    pub recipe_cuisine: Field<Text>,
    #[serde(rename = "cookingMethod")]
    pub cooking_method: Field<Text>,
    #[serde(rename = "prepTime")]
    pub prep_time: Field<String>,
    #[serde(rename = "cookTime")]
    pub cook_time: Field<String>,
    #[serde(rename = "totalTime")]
    pub total_time: Field<String>,
    #[serde(rename = "recipeYield")]
    pub recipe_yield: Field<YieldValue>,
    #[serde(rename = "recipeIngredient", alias = "ingredients")]
    pub recipe_ingredient: Field<Text>,
    #[serde(rename = "recipeInstructions")]
    pub recipe_instructions: Field<Instruction>,
    pub keywords: Field<Text>,
}

impl SourceRecipe {
    /// Every rejected entry, with the name of the property it was found in
    pub fn rejected(&self) -> Vec<(&'static str, &Rejected)> {
        let fields: [(&'static str, &[Rejected]); 18] = [
            ("name", self.name.rejected()),
            ("description", self.description.rejected()),
            ("inLanguage", self.in_language.rejected()),
            ("image", self.image.rejected()),
            ("author", self.author.rejected()),
            ("publisher", self.publisher.rejected()),
            ("url", self.url.rejected()),
            ("datePublished", self.date_published.rejected()),
            ("recipeCategory", self.recipe_category.rejected()),
            ("recipeCuisine", self.recipe_cuisine.rejected()),
            ("cookingMethod", self.cooking_method.rejected()),
            ("prepTime", self.prep_time.rejected()),
            ("cookTime", self.cook_time.rejected()),
            ("totalTime", self.total_time.rejected()),
            ("recipeYield", self.recipe_yield.rejected()),
            ("recipeIngredient", self.recipe_ingredient.rejected()),
            ("recipeInstructions", self.recipe_instructions.rejected()),
            ("keywords", self.keywords.rejected()),
        ];

        fields
            .into_iter()
            .flat_map(|(name, rejected)| rejected.iter().map(move |entry| (name, entry)))
            .collect()
    }
}

impl TryFrom<&Value> for SourceRecipe {
    type Error = serde_json::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        SourceRecipe::deserialize(value)
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Locate the Recipe node in a parsed JSON-LD document.
///
/// The recipe may be the root object, an element of a root array, or an
/// element of an `@graph` array. A root object without any `@type` is taken
/// to be the recipe itself.
pub fn find_recipe_node(document: &Value) -> Option<&Value> {
    match document {
        Value::Array(items) => items.iter().find(|item| is_recipe_type(item)),
        Value::Object(map) => {
            if is_recipe_type(document) {
                Some(document)
            } else if let Some(Value::Array(graph)) = map.get("@graph") {
                graph.iter().find(|item| is_recipe_type(item))
            } else if !map.contains_key("@type") {
                Some(document)
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_recipe_at_root() {
        let doc = json!({"@type": "Recipe", "name": "Soup"});
        assert_eq!(find_recipe_node(&doc).unwrap()["name"], "Soup");
    }

    #[test]
    fn test_find_recipe_case_insensitive_type() {
        let doc = json!({"@type": "recipe", "name": "Soup"});
        assert!(find_recipe_node(&doc).is_some());

        let doc = json!({"@type": ["Recipe", "NewsArticle"], "name": "Soup"});
        assert!(find_recipe_node(&doc).is_some());
    }

    #[test]
    fn test_find_recipe_in_array_and_graph() {
        let doc = json!([
            {"@type": "WebSite", "name": "Site"},
            {"@type": "Recipe", "name": "Stew"}
        ]);
        assert_eq!(find_recipe_node(&doc).unwrap()["name"], "Stew");

        let doc = json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Organization", "name": "Org"},
                {"@type": "Recipe", "name": "Pie"}
            ]
        });
        assert_eq!(find_recipe_node(&doc).unwrap()["name"], "Pie");
    }

    #[test]
    fn test_untyped_root_is_recipe_but_other_types_are_not() {
        assert!(find_recipe_node(&json!({"name": "Soup"})).is_some());
        assert!(find_recipe_node(&json!({"@type": "WebPage", "name": "x"})).is_none());
        assert!(find_recipe_node(&json!("just a string")).is_none());
    }

    #[test]
    fn test_field_shapes() {
        let one: Field<String> = serde_json::from_value(json!("a")).unwrap();
        assert_eq!(one.iter().collect::<Vec<_>>(), ["a"]);

        let many: Field<String> = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(many.iter().count(), 2);

        let null: Field<String> = serde_json::from_value(json!(null)).unwrap();
        assert!(null.is_empty());
        assert!(null.rejected().is_empty());
    }

    #[test]
    fn test_field_sets_aside_wrong_shapes() {
        let field: Field<String> = serde_json::from_value(json!(["1 egg", null, 3])).unwrap();
        assert_eq!(field.iter().collect::<Vec<_>>(), ["1 egg"]);
        assert_eq!(field.rejected().len(), 2);
        assert_eq!(field.rejected()[1].value, json!(3));
    }

    #[test]
    fn test_one_bad_property_keeps_the_recipe() {
        let value = json!({"name": "Soup", "prepTime": 30, "datePublished": 2009});
        let recipe = SourceRecipe::try_from(&value).unwrap();

        assert_eq!(recipe.name.iter().count(), 1);
        assert!(recipe.prep_time.is_empty());
        let fields: Vec<&str> = recipe.rejected().iter().map(|(name, _)| *name).collect();
        assert_eq!(fields, vec!["datePublished", "prepTime"]);
    }

    #[test]
    fn test_text_object_forms() {
        let text: Text = serde_json::from_value(json!({"@value": "nl"})).unwrap();
        assert_eq!(text.as_str(), Some("nl"));

        let term: Text = serde_json::from_value(json!({"@type": "DefinedTerm", "name": "vegan"}))
            .unwrap();
        assert_eq!(term.as_str(), Some("vegan"));
    }
}
