//! Static website output

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{info, warn};

use super::markup::{self, link_list, text};
use super::{write_file, Renderer};
use crate::config::AppSettings;
use crate::error::PublishError;
use crate::loader::{discover_files, Corpus};
use crate::model::{Keyword, RecipeModel};

const TITLE_PLACEHOLDER: &str = "{{title}}";
const CONTENT_PLACEHOLDER: &str = "{{content}}";

const DEFAULT_BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{{title}}</title>
</head>
<body>
{{content}}
</body>
</html>
"#;

/// Base page every site page is wrapped in
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl Default for PageTemplate {
    fn default() -> Self {
        PageTemplate {
            source: DEFAULT_BASE_TEMPLATE.to_string(),
        }
    }
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        PageTemplate {
            source: source.into(),
        }
    }

    /// Read the configured template, or use the built-in one when none is set
    pub fn load(path: Option<&Path>) -> Result<Self, PublishError> {
        let Some(path) = path else {
            return Ok(PageTemplate::default());
        };

        let template_error = |reason: String| PublishError::Template {
            path: path.to_path_buf(),
            reason,
        };

        let source = fs::read_to_string(path).map_err(|e| template_error(e.to_string()))?;
        if !source.contains(CONTENT_PLACEHOLDER) {
            return Err(template_error(format!(
                "no {CONTENT_PLACEHOLDER} placeholder"
            )));
        }

        Ok(PageTemplate::new(source))
    }

    /// Substitute `{{title}}` (escaped) and `{{content}}` (as is) in one pass
    pub fn fill(&self, title: &str, content: &str) -> String {
        let mut page = String::with_capacity(self.source.len() + content.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            page.push_str(&rest[..start]);
            let tail = &rest[start..];

            if let Some(after) = tail.strip_prefix(TITLE_PLACEHOLDER) {
                page.push_str(&text(title));
                rest = after;
            } else if let Some(after) = tail.strip_prefix(CONTENT_PLACEHOLDER) {
                page.push_str(content);
                rest = after;
            } else {
                page.push_str("{{");
                rest = &tail[2..];
            }
        }
        page.push_str(rest);

        page
    }
}

pub struct HtmlSite {
    settings: AppSettings,
    today: NaiveDate,
}

impl HtmlSite {
    pub fn new(settings: AppSettings) -> Self {
        HtmlSite {
            settings,
            today: Local::now().date_naive(),
        }
    }

    /// Use `date` as the generation date on the start page
    pub fn generated_on(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }

    fn output(&self) -> &Path {
        &self.settings.website.output
    }

    fn language(&self) -> &str {
        &self.settings.general.language
    }

    /// Copy the recipe image next to its page and return the reference to
    /// use, or `None` when there is no usable image file.
    fn copy_image(&self, recipe: &RecipeModel) -> Result<Option<String>, PublishError> {
        let Some(image) = recipe.image.as_deref() else {
            return Ok(None);
        };

        let source_dir = recipe.source_file.parent().unwrap_or(Path::new(""));
        let from = source_dir.join(image);
        if !from.is_file() {
            warn!(
                "Image {} for '{}' not found, leaving it out",
                from.display(),
                recipe.name
            );
            return Ok(None);
        }

        // Keep the relative layout unless the path would leave the output directory
        let stays_inside = Path::new(image)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        let reference = if stays_inside {
            image.to_string()
        } else {
            match from.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => return Ok(None),
            }
        };

        let to = self.output().join(&reference);
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
        }
        fs::copy(&from, &to).map_err(|e| PublishError::io(&to, e))?;

        Ok(Some(reference))
    }

    fn keywords_page(&self, keywords: &[Keyword<'_>]) -> String {
        let mut content = String::from("<h1>Index</h1>");
        for keyword in keywords {
            content.push_str(&format!("<h2>{}</h2>", text(&keyword.name)));
            content.push_str(&markup::keyword_links(keyword));
        }
        content
    }

    fn start_page(&self, corpus: &Corpus, keywords: &[Keyword<'_>]) -> String {
        let general = &self.settings.general;
        let mut content = format!("<h1>{}</h1>", text(&general.name));

        if !general.author.is_empty() {
            content.push_str(&format!("<p>{}</p>", text(&general.author)));
        }

        if !corpus.documents.is_empty() {
            content.push_str("<h2>Algemeen</h2>");
            content.push_str(&link_list(
                corpus
                    .documents
                    .iter()
                    .map(|doc| (doc.name.as_str(), doc.output_filename.as_str())),
            ));
        }

        content.push_str("<h2>Recepten</h2>");
        content.push_str(&link_list(
            corpus
                .recipes
                .iter()
                .map(|recipe| (recipe.name.as_str(), recipe.output_filename.as_str())),
        ));

        if !keywords.is_empty() {
            content.push_str(&format!("<h2>{}</h2>", markup::link("Index", "keywords.html")));
        }

        content.push_str(&format!(
            "<p><small>{}</small></p>",
            markup::long_date(self.today, self.language())
        ));

        content
    }
}

impl Renderer for HtmlSite {
    fn name(&self) -> &'static str {
        "website"
    }

    fn render(&self, corpus: &Corpus, keywords: &[Keyword<'_>]) -> Result<(), PublishError> {
        let output = self.output();
        info!("Writing website to {}", output.display());
        fs::create_dir_all(output).map_err(|e| PublishError::io(output, e))?;

        let template = PageTemplate::load(self.settings.website.templates.base.as_deref())?;

        for recipe in &corpus.recipes {
            let image = self.copy_image(recipe)?;
            let content = markup::recipe_body(recipe, image.as_deref(), self.language());
            write_file(
                &output.join(&recipe.output_filename),
                &template.fill(&recipe.name, &content),
            )?;
        }

        for document in &corpus.documents {
            write_file(
                &output.join(&document.output_filename),
                &template.fill(&document.name, &document.html),
            )?;
        }

        write_file(
            &output.join("keywords.html"),
            &template.fill("Index", &self.keywords_page(keywords)),
        )?;

        write_file(
            &output.join("index.html"),
            &template.fill(&self.settings.general.name, &self.start_page(corpus, keywords)),
        )?;

        if let Some(web_files) = &self.settings.website.web_files {
            if web_files.is_dir() {
                let copied = copy_tree(web_files, output)?;
                info!("Copied {copied} web files from {}", web_files.display());
            } else {
                warn!("Web files directory {} not found", web_files.display());
            }
        }

        Ok(())
    }
}

/// Copy every file below `from` into `to`, keeping the relative layout
fn copy_tree(from: &Path, to: &Path) -> Result<usize, PublishError> {
    let files = discover_files(from, "*")?;

    for file in &files {
        let Ok(relative) = file.strip_prefix(from) else {
            continue;
        };
        let target: PathBuf = to.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
        }
        fs::copy(file, &target).map_err(|e| PublishError::io(&target, e))?;
    }

    Ok(files.len())
}
