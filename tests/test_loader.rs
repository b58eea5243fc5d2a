use indoc::indoc;
use recipe_book::config::InputPaths;
use recipe_book::loader::{read_recipes, Corpus};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn recipe_json(name: &str) -> String {
    format!(r#"{{"@context": "https://schema.org", "@type": "Recipe", "name": "{name}"}}"#)
}

#[test]
fn test_bad_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "good.json", &recipe_json("Good Soup"));
    write(dir.path(), "nameless.json", r#"{"@type": "Recipe", "keywords": "x"}"#);
    write(dir.path(), "broken.json", "{ this is not json");
    write(dir.path(), "page.json", r#"{"@type": "WebPage", "name": "About"}"#);

    let recipes = read_recipes(dir.path()).unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].name, "Good Soup");
    assert_eq!(recipes[0].source_file, dir.path().join("good.json"));
}

#[test]
fn test_corpus_is_sorted_and_identified() {
    let recipes = TempDir::new().unwrap();
    write(recipes.path(), "banana.json", &recipe_json("Banana Bread"));
    write(recipes.path(), "nested/apple.json", &recipe_json("Apple Pie"));

    let documents = TempDir::new().unwrap();
    write(
        documents.path(),
        "about.md",
        indoc! {"
            # Over dit boek

            Recepten van de familie.
        "},
    );

    let corpus = Corpus::load(&InputPaths {
        recipes: recipes.path().to_path_buf(),
        documents: Some(documents.path().to_path_buf()),
    })
    .unwrap();

    let names: Vec<&str> = corpus.recipes.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Apple Pie", "Banana Bread"]);
    assert_eq!(corpus.recipes[0].epub_id, "recipe1");
    assert_eq!(corpus.recipes[0].output_filename, "apple.html");
    assert_eq!(corpus.recipes[1].epub_id, "recipe2");
    assert_eq!(corpus.recipes[1].output_filename, "banana.html");

    assert_eq!(corpus.documents.len(), 1);
    assert_eq!(corpus.documents[0].name, "Over dit boek");
    assert_eq!(corpus.documents[0].epub_id, "doc1");
    assert_eq!(corpus.documents[0].output_filename, "about.html");
}

#[test]
fn test_missing_document_directory_means_no_documents() {
    let recipes = TempDir::new().unwrap();
    write(recipes.path(), "soup.json", &recipe_json("Soup"));

    let corpus = Corpus::load(&InputPaths {
        recipes: recipes.path().to_path_buf(),
        documents: Some(recipes.path().join("no-docs-here")),
    })
    .unwrap();

    assert_eq!(corpus.recipes.len(), 1);
    assert!(corpus.documents.is_empty());
}

#[test]
fn test_empty_recipe_directory_gives_empty_corpus() {
    let recipes = TempDir::new().unwrap();
    write(recipes.path(), "notes.txt", "not a recipe");

    let corpus = Corpus::load(&InputPaths {
        recipes: recipes.path().to_path_buf(),
        documents: None,
    })
    .unwrap();

    assert!(corpus.is_empty());
}

#[test]
fn test_unreadable_recipe_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = Corpus::load(&InputPaths {
        recipes: dir.path().join("missing"),
        documents: None,
    });
    assert!(result.is_err());
}
