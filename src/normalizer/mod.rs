//! Collapse a loosely-typed [`SourceRecipe`] into a [`RecipeModel`].
//!
//! Every multi-valued property is reduced by taking its first present value;
//! the remaining values are discarded. Fields that fail to parse are logged
//! and left at their sentinel, only a missing name rejects the recipe.

pub mod schema;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use html_escape::decode_html_entities;
use log::warn;
use url::Url;

use crate::duration::{self, Duration};
use crate::error::PublishError;
use crate::model::{Attribution, RecipeModel, UNSET_DATE};

pub use schema::{find_recipe_node, SourceRecipe};
use schema::{Amount, Field, ImageValue, Instruction, Party, Text, YieldValue};

/// Normalize one source recipe. `origin` names the source (usually its path)
/// in log messages and errors.
///
/// Fails with [`PublishError::Validation`] when the recipe has no name.
pub fn normalize(source: SourceRecipe, origin: &str) -> Result<RecipeModel, PublishError> {
    for (field, rejected) in source.rejected() {
        let e = PublishError::format(field, rejected.value.to_string(), rejected.reason.as_str());
        warn!("{origin}: {e}, ignoring it");
    }

    let name = first_text(&source.name).ok_or_else(|| PublishError::Validation {
        origin: origin.to_string(),
        reason: "recipe has no name".to_string(),
    })?;

    let mut recipe = RecipeModel::new(name);

    recipe.description = first_text(&source.description);
    recipe.in_language = first_text(&source.in_language);
    recipe.image = first_image(&source);
    recipe.attribution = attribution(&source, origin);
    recipe.date_published = date_published(&source, origin);

    recipe.category = first_text(&source.recipe_category);
    recipe.cuisine = first_text(&source.recipe_cuisine);
    recipe.cooking_method = first_text(&source.cooking_method);

    recipe.prep_time = time_field(&source.prep_time, "prepTime", origin);
    recipe.cook_time = time_field(&source.cook_time, "cookTime", origin);
    recipe.total_time = time_field(&source.total_time, "totalTime", origin);

    recipe.recipe_yield = recipe_yield(&source);

    recipe.ingredients = source
        .recipe_ingredient
        .iter()
        .filter_map(Text::as_str)
        .filter(|ingredient| !ingredient.trim().is_empty())
        .map(decode)
        .collect();

    let mut instructions = Vec::new();
    for instruction in source.recipe_instructions.iter() {
        collect_instruction(instruction, &mut instructions, origin);
    }
    recipe.instructions = instructions;

    recipe.keywords = keywords(&source);

    Ok(recipe)
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolve HTML entities (`&amp;`, `&#39;`) sites leave in JSON-LD text.
/// Some encode twice, so decode twice.
fn decode(text: &str) -> String {
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

fn first_text(field: &Field<Text>) -> Option<String> {
    field
        .iter()
        .filter_map(Text::as_str)
        .find_map(|text| non_blank(&decode(text)))
}

fn first_string(field: &Field<String>) -> Option<String> {
    field.iter().find_map(|s| non_blank(s))
}

fn first_image(source: &SourceRecipe) -> Option<String> {
    source.image.iter().find_map(|image| match image {
        ImageValue::Url(url) => non_blank(url),
        ImageValue::Object(obj) => obj
            .url
            .as_deref()
            .and_then(non_blank)
            .or_else(|| obj.content_url.as_deref().and_then(non_blank)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartyKind {
    Person,
    Organization,
}

fn classify(party: &Party, default: PartyKind) -> Option<(PartyKind, String)> {
    match party {
        Party::Name(name) => non_blank(&decode(name)).map(|name| (default, name)),
        Party::Entity(entity) => {
            // Entities that only carry an @id have nothing to show
            let name = entity.name.as_deref().map(decode).as_deref().and_then(non_blank)?;
            let kind = if entity.kind.is_empty() {
                default
            } else if entity.kind.iter().any(|k| k.eq_ignore_ascii_case("person")) {
                PartyKind::Person
            } else {
                PartyKind::Organization
            };
            Some((kind, name))
        }
    }
}

/// A person, from `author` or `publisher`, wins over any organization.
fn attribution(source: &SourceRecipe, origin: &str) -> Option<Attribution> {
    let parties: Vec<(PartyKind, String)> = source
        .author
        .iter()
        .filter_map(|party| classify(party, PartyKind::Person))
        .chain(
            source
                .publisher
                .iter()
                .filter_map(|party| classify(party, PartyKind::Organization)),
        )
        .collect();

    if let Some((_, name)) = parties.iter().find(|(kind, _)| *kind == PartyKind::Person) {
        return Some(Attribution::Author(name.clone()));
    }

    parties
        .into_iter()
        .find(|(kind, _)| *kind == PartyKind::Organization)
        .map(|(_, name)| Attribution::Publisher {
            name,
            url: published_url(source, origin),
        })
}

fn published_url(source: &SourceRecipe, origin: &str) -> Option<Url> {
    let raw = first_string(&source.url)?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("{origin}: ignoring malformed url '{raw}': {e}");
            None
        }
    }
}

fn date_published(source: &SourceRecipe, origin: &str) -> NaiveDate {
    let Some(raw) = first_string(&source.date_published) else {
        return UNSET_DATE;
    };

    match parse_date(&raw) {
        Ok(date) => date,
        Err(e) => {
            warn!("{origin}: {e}, leaving datePublished unset");
            UNSET_DATE
        }
    }
}

/// Accepts `2009-05-08`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, PublishError> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime.date());
    }
    // Timestamps with an offset that RFC 3339 rejects, e.g. `+0200`
    if let Some(date) = raw
        .get(..10)
        .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    {
        return Ok(date);
    }

    Err(PublishError::format(
        "datePublished",
        raw,
        "not an ISO 8601 date",
    ))
}

fn time_field(field: &Field<String>, name: &str, origin: &str) -> Duration {
    let Some(raw) = first_string(field) else {
        return Duration::ZERO;
    };

    match duration::parse(&raw) {
        Ok(duration) => duration,
        Err(e) => {
            warn!("{origin}: {e} in {name}, using zero");
            Duration::ZERO
        }
    }
}

fn format_amount(amount: &Amount) -> Option<String> {
    match amount {
        Amount::Number(n) => Some(n.to_string()),
        Amount::Text(s) => non_blank(s),
    }
}

/// A structured quantity wins over free text, whatever their order in the source.
fn recipe_yield(source: &SourceRecipe) -> Option<String> {
    let quantity = source.recipe_yield.iter().find_map(|value| match value {
        YieldValue::Quantity(q) => {
            let amount = q.value.iter().find_map(format_amount);
            let unit = q.unit_text.iter().find_map(|u| non_blank(&decode(u)));
            match (amount, unit) {
                (Some(amount), Some(unit)) => Some(format!("{amount} {unit}")),
                (Some(only), None) | (None, Some(only)) => Some(only),
                (None, None) => None,
            }
        }
        _ => None,
    });
    if quantity.is_some() {
        return quantity;
    }

    let texts: Vec<String> = source
        .recipe_yield
        .iter()
        .filter_map(|value| match value {
            YieldValue::Text(s) => non_blank(&decode(s)),
            YieldValue::Number(n) => Some(n.to_string()),
            YieldValue::Quantity(_) => None,
        })
        .collect();

    (!texts.is_empty()).then(|| texts.join(", "))
}

fn collect_instruction(instruction: &Instruction, out: &mut Vec<String>, origin: &str) {
    match instruction {
        Instruction::Text(text) => {
            if !text.trim().is_empty() {
                out.push(decode(text));
            }
        }
        Instruction::Step(step) if step.is_section() => {
            for rejected in step.item_list_element.rejected() {
                let e = PublishError::format(
                    "itemListElement",
                    rejected.value.to_string(),
                    rejected.reason.as_str(),
                );
                warn!("{origin}: {e}, ignoring it");
            }
            for child in step.item_list_element.iter() {
                collect_instruction(child, out, origin);
            }
        }
        Instruction::Step(step) => {
            if let Some(text) = step
                .text
                .as_deref()
                .map(decode)
                .as_deref()
                .and_then(non_blank)
                .or_else(|| step.name.as_deref().map(decode).as_deref().and_then(non_blank))
            {
                out.push(text);
            }
        }
    }
}

fn split_keywords(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

fn is_uri(text: &str) -> bool {
    text.contains("://") && Url::parse(text.trim()).is_ok()
}

/// Free-text keywords first, then the ones given as URIs. Duplicates are kept.
fn keywords(source: &SourceRecipe) -> Vec<String> {
    let (uris, texts): (Vec<String>, Vec<String>) = source
        .keywords
        .iter()
        .filter_map(Text::as_str)
        .map(decode)
        .partition(|text| is_uri(text));

    texts
        .iter()
        .chain(&uris)
        .flat_map(|text| split_keywords(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(value: serde_json::Value) -> SourceRecipe {
        SourceRecipe::try_from(&value).unwrap()
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = normalize(source(json!({"description": "x"})), "a.json").unwrap_err();
        assert!(matches!(err, PublishError::Validation { ref origin, .. } if origin == "a.json"));

        let err = normalize(source(json!({"name": "   "})), "b.json").unwrap_err();
        assert!(matches!(err, PublishError::Validation { .. }));
    }

    #[test]
    fn test_first_value_wins() {
        let recipe = normalize(
            source(json!({
                "name": ["Shahi Paneer", "Other"],
                "recipeCategory": ["All", "All Things Indian"],
                "recipeCuisine": [],
                "cookingMethod": "Baking"
            })),
            "t",
        )
        .unwrap();

        assert_eq!(recipe.name, "Shahi Paneer");
        assert_eq!(recipe.category.as_deref(), Some("All"));
        assert_eq!(recipe.cuisine, None);
        assert_eq!(recipe.cooking_method.as_deref(), Some("Baking"));
    }

    #[test]
    fn test_author_wins_over_publisher() {
        let recipe = normalize(
            source(json!({
                "name": "Bread",
                "author": {"@type": "Person", "name": "John Smith"},
                "publisher": {"@type": "Organization", "name": "Some Magazine"},
                "url": "http://example.com"
            })),
            "t",
        )
        .unwrap();

        assert_eq!(recipe.author(), Some("John Smith"));
        assert_eq!(recipe.publisher(), None);
        assert_eq!(recipe.published_url(), None);
    }

    #[test]
    fn test_organization_becomes_publisher_with_url() {
        let recipe = normalize(
            source(json!({
                "name": "Bread",
                "publisher": {"@type": "Organization", "name": "Some Magazine"},
                "url": ["http://example.com", "http://other.example.com"]
            })),
            "t",
        )
        .unwrap();

        assert_eq!(recipe.publisher(), Some("Some Magazine"));
        assert_eq!(recipe.published_url().unwrap().as_str(), "http://example.com/");
        assert_eq!(recipe.author(), None);
    }

    #[test]
    fn test_author_with_only_id_is_ignored() {
        let recipe = normalize(
            source(json!({
                "name": "BLT Pasta Salad",
                "author": {"@id": "https://example.com/#/schema/person/34b9"}
            })),
            "t",
        )
        .unwrap();
        assert!(recipe.attribution.is_none());
    }

    #[test]
    fn test_plain_string_author_and_author_array() {
        let recipe = normalize(source(json!({"name": "x", "author": "Jane Doe"})), "t").unwrap();
        assert_eq!(recipe.author(), Some("Jane Doe"));

        let recipe = normalize(
            source(json!({
                "name": "x",
                "author": [
                    {"@type": "Person", "name": "Chef One"},
                    {"@type": "Person", "name": "Chef Two"}
                ]
            })),
            "t",
        )
        .unwrap();
        assert_eq!(recipe.author(), Some("Chef One"));
    }

    #[test]
    fn test_malformed_url_keeps_publisher() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "publisher": "Some Magazine",
                "url": "not a url"
            })),
            "t",
        )
        .unwrap();
        assert_eq!(recipe.publisher(), Some("Some Magazine"));
        assert!(recipe.published_url().is_none());
    }

    #[test]
    fn test_dates() {
        assert_eq!(parse_date("2009-05-08").unwrap(), NaiveDate::from_ymd_opt(2009, 5, 8).unwrap());
        assert_eq!(
            parse_date("2024-09-07T12:17:45-04:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 7).unwrap()
        );
        assert_eq!(
            parse_date("2024-04-25T05:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 25).unwrap()
        );
        assert_eq!(
            parse_date("2024-04-25T05:00:00+0200").unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 25).unwrap()
        );
        assert!(parse_date("last tuesday").is_err());
    }

    #[test]
    fn test_bad_date_and_duration_fall_back_to_sentinels() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "datePublished": "yesterday",
                "prepTime": "ten minutes",
                "cookTime": "PT1H"
            })),
            "t",
        )
        .unwrap();

        assert_eq!(recipe.date_published, UNSET_DATE);
        assert!(recipe.prep_time.is_zero());
        assert_eq!(recipe.cook_time, Duration::new(1, 0));
    }

    #[test]
    fn test_structured_yield_wins_over_text() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "recipeYield": ["4 servings", {"value": 4, "unitText": "persons"}]
            })),
            "t",
        )
        .unwrap();
        assert_eq!(recipe.recipe_yield.as_deref(), Some("4 persons"));
    }

    #[test]
    fn test_text_yields_are_joined() {
        let recipe = normalize(
            source(json!({"name": "x", "recipeYield": ["15", "15 Stück"]})),
            "t",
        )
        .unwrap();
        assert_eq!(recipe.recipe_yield.as_deref(), Some("15, 15 Stück"));

        let recipe = normalize(source(json!({"name": "x", "recipeYield": 4})), "t").unwrap();
        assert_eq!(recipe.recipe_yield.as_deref(), Some("4"));

        let recipe = normalize(source(json!({"name": "x", "recipeYield": ""})), "t").unwrap();
        assert_eq!(recipe.recipe_yield, None);
    }

    #[test]
    fn test_instruction_shapes() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "recipeInstructions": [
                    "Preheat the oven.",
                    {"@type": "HowToStep", "text": "Mix."},
                    {"@type": "HowToStep", "name": "Only a name."},
                    {
                        "@type": "HowToSection",
                        "name": "Finish",
                        "itemListElement": [
                            {"@type": "HowToStep", "text": "Bake."},
                            {"@type": "HowToStep", "text": "Cool."}
                        ]
                    },
                    ""
                ]
            })),
            "t",
        )
        .unwrap();

        assert_eq!(
            recipe.instructions,
            vec!["Preheat the oven.", "Mix.", "Only a name.", "Bake.", "Cool."]
        );
    }

    #[test]
    fn test_keywords_text_then_uri() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "keywords": ["https://example.com/tags/Vegan", "Rice, Burritos ,", "rice"]
            })),
            "t",
        )
        .unwrap();

        assert_eq!(
            recipe.keywords,
            vec!["rice", "burritos", "rice", "https://example.com/tags/vegan"]
        );
    }

    #[test]
    fn test_image_first_uri() {
        let recipe = normalize(
            source(json!({
                "name": "x",
                "image": [{"@type": "ImageObject", "url": "a.jpg"}, "b.jpg"]
            })),
            "t",
        )
        .unwrap();
        assert_eq!(recipe.image.as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_html_entities_are_decoded() {
        let recipe = normalize(
            source(json!({
                "name": "Mac &amp; Cheese",
                "description": "Grandma&#39;s",
                "recipeCategory": "Pasta &amp;amp; Rice",
                "recipeIngredient": ["200 g macaroni &amp; cheese"],
                "recipeInstructions": [{"@type": "HowToStep", "text": "Boil &quot;al dente&quot;"}],
                "keywords": "mac &amp; cheese, comfort"
            })),
            "t",
        )
        .unwrap();

        assert_eq!(recipe.name, "Mac & Cheese");
        assert_eq!(recipe.description.as_deref(), Some("Grandma's"));
        assert_eq!(recipe.category.as_deref(), Some("Pasta & Rice"));
        assert_eq!(recipe.ingredients, vec!["200 g macaroni & cheese"]);
        assert_eq!(recipe.instructions, vec![r#"Boil "al dente""#]);
        assert_eq!(recipe.keywords, vec!["mac & cheese", "comfort"]);
    }

    #[test]
    fn test_wrongly_shaped_properties_fall_back_to_defaults() {
        let recipe = normalize(
            source(json!({
                "name": "Omelette",
                "prepTime": 30,
                "cookTime": "PT5M",
                "datePublished": 2009,
                "recipeIngredient": ["1 egg", null, "salt"],
                "keywords": 7
            })),
            "t",
        )
        .unwrap();

        assert!(recipe.prep_time.is_zero());
        assert_eq!(recipe.cook_time, Duration::new(0, 5));
        assert!(recipe.published_on().is_none());
        assert_eq!(recipe.ingredients, vec!["1 egg", "salt"]);
        assert!(recipe.keywords.is_empty());
    }
}
