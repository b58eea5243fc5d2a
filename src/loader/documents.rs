use std::fs;
use std::path::Path;

use log::{debug, error, info};
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::discover;
use crate::error::PublishError;
use crate::model::Document;

/// Text of the first level-1 heading, if it has any
fn first_title(events: &[Event<'_>]) -> Option<String> {
    let start = events.iter().position(|event| {
        matches!(
            event,
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            })
        )
    })?;

    let mut title = String::new();
    for event in &events[start + 1..] {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(text) | Event::Code(text) => title.push_str(text),
            Event::SoftBreak | Event::HardBreak => title.push(' '),
            _ => {}
        }
    }

    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Convert Markdown (CommonMark with pipe tables) into a [`Document`].
///
/// The name is the first level-1 heading, or the file name when there is none.
pub fn markdown_to_document(markdown: &str, source: &Path) -> Document {
    let events: Vec<Event<'_>> = Parser::new_ext(markdown, Options::ENABLE_TABLES).collect();

    let name = first_title(&events).unwrap_or_else(|| {
        source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());

    Document {
        name,
        source_file: source.to_path_buf(),
        output_filename: String::new(),
        html: body,
        epub_id: String::new(),
    }
}

pub fn read_document_file(path: &Path) -> Result<Document, PublishError> {
    let markdown = fs::read_to_string(path).map_err(|e| PublishError::io(path, e))?;
    Ok(markdown_to_document(&markdown, path))
}

/// Read every `*.md` document below `dir`, in sorted path order
pub fn read_documents(dir: &Path) -> Result<Vec<Document>, PublishError> {
    info!("Reading documents from {}", dir.display());

    let mut documents = Vec::new();
    for path in discover(dir, "md")? {
        match read_document_file(&path) {
            Ok(document) => {
                debug!("Loaded document '{}' from {}", document.name, path.display());
                documents.push(document);
            }
            Err(e) => error!("Skipping document: {e}"),
        }
    }

    Ok(documents)
}
