use folio::{Chapter, ChapterKind, ContentDocument, DocumentStore, Result};
use folio::model::cover;

fn course() -> ContentDocument {
    let mut doc = ContentDocument::new();
    doc.push_chapter(Chapter::new("Cells", "<h1>Cells</h1><p>Small.</p>"));
    doc.push_chapter(Chapter::new("Genetics", "<h1>Genetics</h1><p>DNA.</p>"));
    doc
}

#[test]
fn remove_cover_undoes_insert_cover() {
    let doc = course();
    let restored = doc.insert_cover("https://cdn.example/cover.png").remove_cover();
    assert_eq!(restored.chapters(), doc.chapters());
}

#[test]
fn cover_classification_survives_persistence() {
    let with_cover = course().insert_cover("https://cdn.example/cover.png");
    assert_eq!(with_cover.chapters()[0].kind(), ChapterKind::Cover);

    let mut doc = with_cover;
    for _ in 0..3 {
        doc = ContentDocument::from_json(&doc.to_json().unwrap());
        assert_eq!(doc.chapters()[0].kind(), ChapterKind::Cover);
        assert_eq!(
            cover::cover_image_src(&doc.chapters()[0].body).as_deref(),
            Some("https://cdn.example/cover.png")
        );
    }
}

#[test]
fn legacy_image_only_chapter_counts_as_cover() {
    // Old documents have no data-cover marker; a lone image with no
    // headings is still recognized.
    let mut doc = ContentDocument::new();
    doc.push_chapter(Chapter::new(
        "Cover",
        "<div><img src=\"https://cdn.example/old.jpg\"></div>",
    ));
    doc.push_chapter(Chapter::new("Body", "<h1>Body</h1>"));
    assert_eq!(doc.chapters()[0].kind(), ChapterKind::Cover);
    assert_eq!(doc.cover().unwrap().title, "Cover");
}

#[test]
fn mid_document_image_chapter_survives_cover_removal() {
    let mut doc = course();
    doc.push_chapter(Chapter::new(
        "Diagram",
        "<div><img src=\"https://cdn.example/cells.png\"></div>",
    ));

    let removed = doc.insert_cover("https://cdn.example/cover.png").remove_cover();
    assert_eq!(removed.len(), 3);
    assert_eq!(removed.chapters()[2].title, "Diagram");
    assert_eq!(removed.chapters(), doc.chapters());
}

struct MemoryStore(Vec<String>);

impl DocumentStore for MemoryStore {
    fn save(&mut self, json: &str) -> Result<()> {
        self.0.push(json.to_string());
        Ok(())
    }
}

#[test]
fn committed_cover_insert_persists_the_new_shape() {
    let mut doc = course();
    doc.select(1);
    let mut store = MemoryStore(Vec::new());

    let next = doc.insert_cover("https://cdn.example/cover.png");
    doc.commit(next, &mut store).unwrap();

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.selected_chapter().unwrap().title, "Genetics");

    let saved = ContentDocument::from_json(store.0.last().unwrap());
    assert_eq!(saved.chapters()[0].kind(), ChapterKind::Cover);
    assert_eq!(saved.len(), 3);
}
