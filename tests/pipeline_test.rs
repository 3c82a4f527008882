//! End-to-end tests: PDF on disk -> extraction -> translation -> output file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lopdf::{dictionary, Document, Object, Stream};
use pdftrans::error::Result;
use pdftrans::pipeline::UnitKind;
use pdftrans::translate::GlossaryEntry;
use pdftrans::{
    extract_file, paragraphs, split_units, translate_file, Config, Error, ErrorPolicy,
    ExtractOptions, Glossary, PageSelection, Pipeline, PipelineOptions, Translator,
};

/// Wraps text in a language tag.
struct Bracketing;

impl Translator for Bracketing {
    fn name(&self) -> &str {
        "bracketing"
    }

    fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        Ok(format!("<{}>{}</{}>", target_language, text, target_language))
    }
}

/// Fails every call after the first `ok` calls.
struct Exhausting {
    ok: usize,
    calls: AtomicUsize,
}

impl Translator for Exhausting {
    fn name(&self) -> &str {
        "exhausting"
    }

    fn translate(&self, text: &str, _target_language: &str) -> Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.ok {
            Ok(text.to_string())
        } else {
            Err(Error::translation("exhausting", "HTTP 429: quota exceeded"))
        }
    }
}

fn write_pdf(path: &std::path::Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

const PAGE_ONE: &str = "BT /F1 12 Tf 72 720 Td (The heart of the matter is) Tj ET \
    BT /F1 10 Tf 72 60 Td ([1] First footnote.) Tj ET \
    BT /F1 10 Tf 300 30 Td (1) Tj ET";
const PAGE_TWO: &str = "BT /F1 12 Tf 72 720 Td (simple to state.) Tj ET \
    BT /F1 12 Tf 72 600 Td (A second paragraph.) Tj ET \
    BT /F1 10 Tf 72 60 Td (* Second footnote.) Tj ET \
    BT /F1 10 Tf 300 30 Td (2) Tj ET";

fn book(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("book.pdf");
    write_pdf(&path, &[PAGE_ONE, PAGE_TWO]);
    path
}

#[test]
fn test_paragraphs_span_pages() {
    let dir = tempfile::tempdir().unwrap();
    let paragraphs = paragraphs(book(&dir)).unwrap();
    let texts: Vec<&str> = paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["The heart of the matter is simple to state.", "A second paragraph."]
    );
}

#[test]
fn test_translate_file_writes_ordered_units() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("book.hi.txt");

    let report =
        translate_file(Bracketing, book(&dir), &output, PipelineOptions::new("hi")).unwrap();
    assert_eq!(report.paragraphs, 2);
    assert_eq!(report.footnotes, 2);
    assert!(report.is_complete());

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "<hi>The heart of the matter is simple to state.</hi>\n\n\
         <hi>A second paragraph.</hi>\n\n\
         Page num: 1\n<hi>[1] First footnote.</hi>\n\n\
         Page num: 2\n<hi>* Second footnote.</hi>\n\n"
    );
    assert_eq!(split_units(&written), report.units);
}

#[test]
fn test_parallel_output_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let input = book(&dir);
    let sequential = dir.path().join("sequential.txt");
    let parallel = dir.path().join("parallel.txt");

    translate_file(Bracketing, &input, &sequential, PipelineOptions::new("ta")).unwrap();
    translate_file(Bracketing, &input, &parallel, PipelineOptions::new("ta").parallel(3)).unwrap();

    assert_eq!(
        std::fs::read_to_string(&sequential).unwrap(),
        std::fs::read_to_string(&parallel).unwrap()
    );
}

#[test]
fn test_page_selection_and_glossary() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("page1.txt");
    let glossary =
        Glossary::from_entries([GlossaryEntry::new("heart", "हृदय", "hriday")]).unwrap();

    let pipeline = Pipeline::new(Bracketing, PipelineOptions::new("hi").with_glossary(glossary));
    let extract = ExtractOptions::new().with_pages(PageSelection::Pages(vec![1]));
    let report = pipeline.translate_document(book(&dir), extract, &output).unwrap();

    assert_eq!(
        report.units,
        vec![
            "<hi>the हृदय of the matter is</hi>",
            "Page num: 1\n<hi>[1] First footnote.</hi>",
        ]
    );
}

#[test]
fn test_failures_follow_policy() {
    let dir = tempfile::tempdir().unwrap();
    let input = book(&dir);

    let marker = Pipeline::new(
        Exhausting { ok: 1, calls: AtomicUsize::new(0) },
        PipelineOptions::new("hi"),
    )
    .translate_document(&input, ExtractOptions::default(), dir.path().join("marker.txt"))
    .unwrap();
    assert_eq!(marker.units.len(), 4);
    assert_eq!(marker.failures.len(), 3);
    assert!(marker.units[1].contains("quota exceeded"));
    assert_eq!(marker.failures[2].kind, UnitKind::Footnote);

    let skip = Pipeline::new(
        Exhausting { ok: 1, calls: AtomicUsize::new(0) },
        PipelineOptions::new("hi").with_error_policy(ErrorPolicy::Skip),
    )
    .translate_document(&input, ExtractOptions::default(), dir.path().join("skip.txt"))
    .unwrap();
    assert_eq!(skip.units, vec!["The heart of the matter is simple to state."]);

    let abort_output = dir.path().join("abort.txt");
    let aborting = Pipeline::new(
        Exhausting { ok: 1, calls: AtomicUsize::new(0) },
        PipelineOptions::new("hi").with_error_policy(ErrorPolicy::Abort),
    );
    let abort = aborting.translate_document(&input, ExtractOptions::default(), &abort_output);
    assert!(matches!(abort, Err(Error::Translation { .. })));
    assert!(!abort_output.exists());
    // The remaining paragraph and both footnotes are never sent
    assert_eq!(aborting.translator().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_progress_callback_counts_units() {
    let dir = tempfile::tempdir().unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    let pipeline = Pipeline::new(Bracketing, PipelineOptions::new("hi"))
        .with_progress(move |_, total| {
            assert_eq!(total, 4);
            counter.fetch_add(1, Ordering::SeqCst);
        });
    pipeline
        .translate_document(book(&dir), ExtractOptions::default(), dir.path().join("out.txt"))
        .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 4);
}

#[test]
fn test_config_drives_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::parse("[extract]\npages = \"2\"\n").unwrap();
    let options = config.extract_options().unwrap();
    let extraction = pdftrans::extract_file_with_options(book(&dir), options).unwrap();

    assert_eq!(extraction.body, vec!["simple to state.", "A second paragraph."]);
    assert_eq!(extraction.footnotes.len(), 1);
    assert_eq!(extraction.page_count, 2);
}

#[test]
fn test_not_a_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, "plain text pretending to be a PDF").unwrap();
    assert!(matches!(extract_file(&path), Err(Error::UnknownFormat)));
}
