//! Markup shared by the website and the book.
//!
//! Everything produced here is well-formed XHTML so the EPUB pages can use it
//! as is; browsers read it as ordinary HTML.

use std::borrow::Cow;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::duration::Duration;
use crate::model::{Attribution, Keyword, RecipeModel};

const DUTCH_MONTHS: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];

pub fn text(value: &str) -> Cow<'_, str> {
    encode_text(value)
}

pub fn attr(value: &str) -> Cow<'_, str> {
    encode_double_quoted_attribute(value)
}

/// Percent-encode a relative file reference for use in `href`/`src`
pub fn href(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/")
}

fn is_dutch(language: &str) -> bool {
    language.to_ascii_lowercase().starts_with("nl")
}

/// "mei 2009" for Dutch, "May 2009" otherwise
pub fn month_year(date: NaiveDate, language: &str) -> String {
    if is_dutch(language) {
        use chrono::Datelike;
        format!("{} {}", DUTCH_MONTHS[date.month0() as usize], date.year())
    } else {
        date.format("%B %Y").to_string()
    }
}

/// "8 mei 2009" for Dutch, "8 May 2009" otherwise
pub fn long_date(date: NaiveDate, language: &str) -> String {
    use chrono::Datelike;
    format!("{} {}", date.day(), month_year(date, language))
}

pub fn link(name: &str, target: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        attr(&href(target)),
        text(name)
    )
}

/// `<ul>` of links, one per `(name, target)`
pub fn link_list<'a>(links: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut list = String::from("<ul>");
    for (name, target) in links {
        list.push_str("<li>");
        list.push_str(&link(name, target));
        list.push_str("</li>");
    }
    list.push_str("</ul>");
    list
}

pub fn keyword_links(keyword: &Keyword<'_>) -> String {
    link_list(
        keyword
            .recipes
            .iter()
            .map(|recipe| (recipe.name.as_str(), recipe.output_filename.as_str())),
    )
}

/// "Gemaakt door …" / "Gepubliceerd door …", with " in {month year}" when dated
pub fn byline(recipe: &RecipeModel, language: &str) -> Option<String> {
    let mut by = match &recipe.attribution {
        Some(Attribution::Author(author)) => format!("Gemaakt door {}", text(author)),
        Some(Attribution::Publisher { name, url: Some(url) }) => format!(
            r#"Gepubliceerd door <a href="{}">{}</a>"#,
            attr(url.as_str()),
            text(name)
        ),
        Some(Attribution::Publisher { name, url: None }) => {
            format!("Gepubliceerd door {}", text(name))
        }
        None => String::new(),
    };

    if let Some(date) = recipe.published_on() {
        if by.is_empty() {
            by.push_str("Gepubliceerd");
        }
        by.push_str(" in ");
        by.push_str(&month_year(date, language));
    }

    (!by.is_empty()).then_some(by)
}

fn time_line(label: &str, time: Duration) -> Option<String> {
    (!time.is_zero()).then(|| format!("{label}: {}", time.to_readable()))
}

pub fn times(recipe: &RecipeModel) -> Option<String> {
    let lines: Vec<String> = [
        time_line("Voorbereidingstijd", recipe.prep_time),
        time_line("Bereidingstijd", recipe.cook_time),
        time_line("Totale bereidingstijd", recipe.total_time),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!lines.is_empty()).then(|| lines.join("<br />"))
}

/// The body of a recipe page. `image` is the reference to show, if any.
pub fn recipe_body(recipe: &RecipeModel, image: Option<&str>, language: &str) -> String {
    let language = recipe.in_language.as_deref().unwrap_or(language);
    let mut body = String::new();

    body.push_str(&format!("<h1>{}</h1>", text(&recipe.name)));

    if let Some(image) = image {
        body.push_str(&format!(
            r#"<p><img src="{}" alt="{}" /></p>"#,
            attr(&href(image)),
            attr(&recipe.name)
        ));
    }

    if let Some(description) = &recipe.description {
        body.push_str(&format!("<p>{}</p>", text(description)));
    }

    if let Some(by) = byline(recipe, language) {
        body.push_str(&format!("<p>{by}</p>"));
    }

    if let Some(times) = times(recipe) {
        body.push_str(&format!("<p>{times}</p>"));
    }

    if let Some(recipe_yield) = &recipe.recipe_yield {
        body.push_str(&format!("<p>Voor {}</p>", text(recipe_yield)));
    }

    body.push_str("<h2>Ingrediënten</h2><ul>");
    for ingredient in &recipe.ingredients {
        body.push_str(&format!("<li>{}</li>", text(ingredient)));
    }
    body.push_str("</ul>");

    body.push_str("<h2>Bereidingswijze</h2><ol>");
    for instruction in &recipe.instructions {
        body.push_str(&format!("<li>{}</li>", text(instruction)));
    }
    body.push_str("</ol>");

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_year(date(2009, 5, 8), "nl"), "mei 2009");
        assert_eq!(month_year(date(2009, 5, 8), "nl-BE"), "mei 2009");
        assert_eq!(month_year(date(2009, 5, 8), "en"), "May 2009");
        assert_eq!(long_date(date(2026, 10, 16), "nl"), "16 oktober 2026");
    }

    #[test]
    fn test_href_encoding() {
        assert_eq!(href("Apple Pie.html"), "Apple%20Pie.html");
        assert_eq!(href("img/bread.jpg"), "img/bread.jpg");
        assert_eq!(href("crème.html"), "cr%C3%A8me.html");
        assert_eq!(href("Mac & Cheese #2.html"), "Mac%20%26%20Cheese%20%232.html");
    }

    #[test]
    fn test_byline_author_with_date() {
        let mut recipe = RecipeModel::new("Bread");
        recipe.attribution = Some(Attribution::Author("John Smith".to_string()));
        recipe.date_published = date(2009, 5, 8);
        assert_eq!(
            byline(&recipe, "nl").unwrap(),
            "Gemaakt door John Smith in mei 2009"
        );
    }

    #[test]
    fn test_byline_linked_publisher() {
        let mut recipe = RecipeModel::new("Bread");
        recipe.attribution = Some(Attribution::Publisher {
            name: "Some & Co".to_string(),
            url: Some(Url::parse("http://example.com").unwrap()),
        });
        assert_eq!(
            byline(&recipe, "nl").unwrap(),
            r#"Gepubliceerd door <a href="http://example.com/">Some &amp; Co</a>"#
        );
    }

    #[test]
    fn test_byline_date_only_and_nothing() {
        let mut recipe = RecipeModel::new("Bread");
        assert!(byline(&recipe, "nl").is_none());

        recipe.date_published = date(2020, 1, 2);
        assert_eq!(byline(&recipe, "nl").unwrap(), "Gepubliceerd in januari 2020");

        recipe.date_published = date(1900, 1, 2);
        assert!(byline(&recipe, "nl").is_none());
    }

    #[test]
    fn test_times_skip_zero() {
        let mut recipe = RecipeModel::new("Bread");
        assert!(times(&recipe).is_none());

        recipe.prep_time = Duration::new(0, 15);
        recipe.total_time = Duration::new(1, 15);
        assert_eq!(
            times(&recipe).unwrap(),
            "Voorbereidingstijd: 15 minuten<br />Totale bereidingstijd: 1 uur, 15 minuten"
        );
    }

    #[test]
    fn test_recipe_body_escapes_content() {
        let mut recipe = RecipeModel::new("Mac & Cheese");
        recipe.ingredients = vec!["<b>pasta</b>".to_string()];
        recipe.instructions = vec!["Boil".to_string(), "Mix".to_string()];
        recipe.recipe_yield = Some("4 persons".to_string());

        let body = recipe_body(&recipe, None, "nl");
        assert!(body.starts_with("<h1>Mac &amp; Cheese</h1>"));
        assert!(body.contains("<li>&lt;b&gt;pasta&lt;/b&gt;</li>"));
        assert!(body.contains("<ol><li>Boil</li><li>Mix</li></ol>"));
        assert!(body.contains("<p>Voor 4 persons</p>"));
        assert!(!body.contains("<img"));
    }
}
