//! EPUB 2 book output.
//!
//! Pages are staged in a temporary directory laid out like the final archive
//! and then zipped, with the uncompressed `mimetype` entry first.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{Local, NaiveDate};
use log::{info, warn};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::markup::{self, attr, href, text};
use super::{write_file, Renderer};
use crate::config::AppSettings;
use crate::error::PublishError;
use crate::loader::{discover_files, Corpus};
use crate::model::Keyword;

pub const MIMETYPE: &str = "application/epub+zip";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// One page of the book, in reading order
struct Page<'a> {
    id: &'a str,
    title: &'a str,
    href: String,
}

pub struct EpubBook {
    settings: AppSettings,
    today: NaiveDate,
}

impl EpubBook {
    pub fn new(settings: AppSettings) -> Self {
        EpubBook {
            settings,
            today: Local::now().date_naive(),
        }
    }

    /// Use `date` as the publication date of the book
    pub fn published_on(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }

    fn language(&self) -> &str {
        &self.settings.general.language
    }

    /// Reading order: cover, documents, recipes, index
    fn pages<'a>(&self, corpus: &'a Corpus) -> Vec<Page<'a>> {
        let mut pages = vec![Page {
            id: "coverpage",
            title: "Cover",
            href: "OEBPS/coverpage.html".to_string(),
        }];

        pages.extend(corpus.documents.iter().map(|doc| Page {
            id: &doc.epub_id,
            title: &doc.name,
            href: format!("OEBPS/{}", doc.output_filename),
        }));

        pages.extend(corpus.recipes.iter().map(|recipe| Page {
            id: &recipe.epub_id,
            title: &recipe.name,
            href: format!("OEBPS/{}", recipe.output_filename),
        }));

        pages.push(Page {
            id: "indexpage",
            title: "Index",
            href: "OEBPS/indexpage.html".to_string(),
        });

        pages
    }

    fn xhtml_page(&self, title: &str, body: &str) -> String {
        let language = attr(self.language());
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{language}" lang="{language}">
<head>
<meta http-equiv="Content-Type" content="application/xhtml+xml; charset=utf-8" />
<title>{}</title>
</head>
<body>
{body}
</body>
</html>
"#,
            text(title)
        )
    }

    fn cover_page(&self) -> String {
        let general = &self.settings.general;
        let mut body = format!("<h1>{}</h1>", text(&general.name));
        if !general.author.is_empty() {
            body.push_str(&format!("<h2>{}</h2>", text(&general.author)));
        }
        body.push_str(&format!(
            "<p>&#160;</p><p>{}</p>",
            markup::long_date(self.today, self.language())
        ));
        self.xhtml_page(&general.name, &body)
    }

    fn index_page(&self, keywords: &[Keyword<'_>]) -> String {
        let mut body = String::from("<h1>Index</h1>");
        for keyword in keywords {
            body.push_str(&format!("<p>{}</p>", text(&keyword.name)));
            body.push_str(&markup::keyword_links(keyword));
        }
        self.xhtml_page("Index", &body)
    }

    fn content_opf(&self, pages: &[Page<'_>]) -> String {
        let general = &self.settings.general;

        let mut manifest = String::from(
            r#"    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
"#,
        );
        let mut spine = String::new();
        for page in pages {
            manifest.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
                attr(page.id),
                attr(&href(&page.href))
            ));
            spine.push_str(&format!("    <itemref idref=\"{}\"/>\n", attr(page.id)));
        }

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="BookId">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>{title}</dc:title>
    <dc:creator opf:role="aut">{creator}</dc:creator>
    <dc:language>{language}</dc:language>
    <dc:identifier id="BookId" opf:scheme="UUID">urn:uuid:{id}</dc:identifier>
    <dc:date opf:event="publication">{date}</dc:date>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#,
            title = text(&general.name),
            creator = text(&general.author),
            language = text(&general.language),
            id = self.settings.epub.book_id,
            date = self.today.format("%Y-%m-%d"),
        )
    }

    fn toc_ncx(&self, pages: &[Page<'_>]) -> String {
        let mut nav_map = String::new();
        for (order, page) in pages.iter().enumerate() {
            nav_map.push_str(&format!(
                r#"    <navPoint id="{id}" playOrder="{order}">
      <navLabel><text>{title}</text></navLabel>
      <content src="{src}"/>
    </navPoint>
"#,
                id = attr(page.id),
                order = order + 1,
                title = text(page.title),
                src = attr(&href(&page.href)),
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:uuid:{id}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{nav_map}  </navMap>
</ncx>
"#,
            id = self.settings.epub.book_id,
            title = text(&self.settings.general.name),
        )
    }

    /// Write every file of the book below `root`
    fn stage(
        &self,
        root: &Path,
        corpus: &Corpus,
        keywords: &[Keyword<'_>],
    ) -> Result<(), PublishError> {
        let oebps = root.join("OEBPS");

        write_file(&root.join("META-INF/container.xml"), CONTAINER_XML)?;
        write_file(&oebps.join("coverpage.html"), &self.cover_page())?;

        for document in &corpus.documents {
            write_file(
                &oebps.join(&document.output_filename),
                &self.xhtml_page(&document.name, &document.html),
            )?;
        }

        for recipe in &corpus.recipes {
            let body = markup::recipe_body(recipe, None, self.language());
            write_file(
                &oebps.join(&recipe.output_filename),
                &self.xhtml_page(&recipe.name, &body),
            )?;
        }

        write_file(&oebps.join("indexpage.html"), &self.index_page(keywords))?;

        let pages = self.pages(corpus);
        write_file(&root.join("content.opf"), &self.content_opf(&pages))?;
        write_file(&root.join("toc.ncx"), &self.toc_ncx(&pages))?;

        Ok(())
    }
}

impl Renderer for EpubBook {
    fn name(&self) -> &'static str {
        "epub"
    }

    fn render(&self, corpus: &Corpus, keywords: &[Keyword<'_>]) -> Result<(), PublishError> {
        let epub = &self.settings.epub;
        let staging = tempfile::Builder::new()
            .prefix(&format!("{}-", epub.book_id))
            .tempdir()
            .map_err(|e| PublishError::io(std::env::temp_dir(), e))?;

        let result = self
            .stage(staging.path(), corpus, keywords)
            .and_then(|()| package(staging.path(), &epub.filename));

        finish_staging(staging, epub.keep_working_dir);

        if result.is_ok() {
            info!("Wrote EPUB to {}", epub.filename.display());
        }
        result
    }
}

fn finish_staging(staging: TempDir, keep: bool) {
    if keep {
        let kept = staging.keep();
        info!("Kept EPUB working directory {}", kept.display());
        return;
    }

    let path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        warn!("Failed to remove working directory {}: {e}", path.display());
    }
}

/// Zip the staged book at `root` into `target`
pub fn package(root: &Path, target: &Path) -> Result<(), PublishError> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PublishError::io(parent, e))?;
    }

    let file = File::create(target).map_err(|e| PublishError::io(target, e))?;
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("mimetype", stored)?;
    zip.write_all(MIMETYPE.as_bytes())
        .map_err(|e| PublishError::io(target, e))?;

    for path in discover_files(root, "*")? {
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let bytes = fs::read(&path).map_err(|e| PublishError::io(&path, e))?;
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, deflated)?;
        zip.write_all(&bytes)
            .map_err(|e| PublishError::io(target, e))?;
    }

    zip.finish()?;
    Ok(())
}
