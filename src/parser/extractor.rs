//! PDF text extraction using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{Extraction, PageFragment};
use crate::segment::{partition, BlockClassifier};

use super::content::SpanDecoder;
use super::layout::page_regions;
use super::normalize::normalize_text;
use super::options::{ErrorMode, ExtractOptions, PageSelection};

/// US Letter height, used when a page has no usable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Guards against cyclic Parent chains.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Extracts positioned text fragments from a PDF.
pub struct PdfExtractor {
    doc: LopdfDocument,
    options: ExtractOptions,
}

impl PdfExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let format = detect_format_from_path(path)?;
        log::debug!("Opening {} ({})", path.display(), format);

        let doc = LopdfDocument::load(path)?;
        Ok(Self::with_document(doc, options))
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::with_document(doc, options))
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R, options: ExtractOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn with_document(doc: LopdfDocument, options: ExtractOptions) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text may not decode");
        }
        Self { doc, options }
    }

    /// Total number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Positioned fragments of every selected page, in reading order.
    pub fn fragments(&self) -> Result<Vec<PageFragment>> {
        let pages = self.selected_pages()?;
        log::info!("Extracting text from {} page(s)", pages.len());

        let mut fragments = Vec::new();
        for (page_num, page_id) in pages {
            match self.page_fragments(page_num, page_id) {
                Ok(page) => {
                    log::debug!("Page {}: {} fragment(s)", page_num, page.len());
                    fragments.extend(page);
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", page_num, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(fragments)
    }

    /// Extract and classify the selected pages into body text and footnotes.
    pub fn extract(&self) -> Result<Extraction> {
        let fragments = self.fragments()?;
        let classifier = BlockClassifier::new(self.options.classifier);

        let mut extraction = partition(&classifier, &fragments);
        extraction.page_count = self.page_count();

        log::info!(
            "Extracted {} body fragment(s) and {} footnote(s), discarded {}",
            extraction.body.len(),
            extraction.footnotes.len(),
            extraction.discarded
        );
        Ok(extraction)
    }

    /// Selected pages as (1-based number, object id), in document order.
    fn selected_pages(&self) -> Result<Vec<(u32, ObjectId)>> {
        let pages = self.doc.get_pages();
        let total = pages.len() as u32;

        let out_of_range = match &self.options.pages {
            PageSelection::All => None,
            PageSelection::Range(range) => Some(*range.end()).filter(|end| *end > total),
            PageSelection::Pages(list) => list.iter().copied().find(|p| *p > total),
        };
        if let Some(page) = out_of_range {
            return Err(Error::PageOutOfRange(page, total));
        }

        Ok(pages
            .into_iter()
            .filter(|(num, _)| self.options.pages.includes(*num))
            .collect())
    }

    fn page_fragments(&self, page_num: u32, page_id: ObjectId) -> Result<Vec<PageFragment>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page_num, e)))?;
        let content = self
            .doc
            .get_page_content(page_id)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page_num, e)))?;

        let spans = SpanDecoder::for_page(&self.doc, fonts).decode(&content)?;
        let [_, bottom, _, top] = self.media_box(page_id);
        let page_height = top - bottom;
        let page_index = page_num - 1;

        let fragments = page_regions(spans)
            .into_iter()
            .filter_map(|region| {
                let raw = region.text();
                let text = if self.options.normalize_text {
                    normalize_text(&raw)
                } else {
                    raw
                };
                if text.trim().is_empty() {
                    return None;
                }
                let y_position = (top - region.top()).max(0.0);
                Some(PageFragment::new(text, page_index, y_position, page_height))
            })
            .collect();

        Ok(fragments)
    }

    /// MediaBox of a page, following the Parent chain for inherited values.
    fn media_box(&self, page_id: ObjectId) -> [f32; 4] {
        let fallback = [0.0, 0.0, 612.0, DEFAULT_PAGE_HEIGHT];
        let mut dict = self.doc.get_dictionary(page_id).ok();

        for _ in 0..MAX_INHERITANCE_DEPTH {
            let Some(current) = dict else {
                break;
            };
            if let Some(media_box) = self.read_rect(current, b"MediaBox") {
                return media_box;
            }
            dict = current
                .get(b"Parent")
                .and_then(Object::as_reference)
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }

        log::debug!("No usable MediaBox for {:?}, assuming US Letter", page_id);
        fallback
    }

    fn read_rect(&self, dict: &Dictionary, key: &[u8]) -> Option<[f32; 4]> {
        let object = dict.get(key).ok()?;
        let (_, object) = self.doc.dereference(object).ok()?;
        let array = object.as_array().ok()?;
        if array.len() < 4 {
            return None;
        }

        let mut rect = [0.0f32; 4];
        for (slot, value) in rect.iter_mut().zip(array) {
            *slot = match value {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => return None,
            };
        }
        (rect[3] > rect[1]).then_some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FootnoteEntry;
    use crate::segment::ClassifierConfig;
    use lopdf::{dictionary, Stream};

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
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
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
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

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    const PAGE_ONE: &str = "BT /F1 12 Tf 72 720 Td (Chapter one begins with) Tj 0 -14 Td (a sentence that) Tj ET \
        BT /F1 10 Tf 72 60 Td ([1] A footnote at the bottom.) Tj ET \
        BT /F1 10 Tf 300 30 Td (1) Tj ET";
    const PAGE_TWO: &str = "BT /F1 12 Tf 72 720 Td (continues here.) Tj ET";

    #[test]
    fn test_rejects_non_pdf() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"Not a PDF at all"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_page_count() {
        let extractor = PdfExtractor::from_bytes(&build_pdf(&[PAGE_ONE, PAGE_TWO])).unwrap();
        assert_eq!(extractor.page_count(), 2);
    }

    #[test]
    fn test_fragments_have_top_down_positions() {
        let extractor = PdfExtractor::from_bytes(&build_pdf(&[PAGE_ONE])).unwrap();
        let fragments = extractor.fragments().unwrap();

        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0].text, "Chapter one begins with a sentence that");
        assert_eq!(fragments[0].page_height, 792.0);
        assert!(fragments[0].y_position < 100.0);
        assert!(fragments[1].y_position > 700.0);
        assert_eq!(fragments[2].text, "1");
    }

    #[test]
    fn test_extract_partitions_body_and_footnotes() {
        let extractor = PdfExtractor::from_bytes(&build_pdf(&[PAGE_ONE, PAGE_TWO])).unwrap();
        let extraction = extractor.extract().unwrap();

        assert_eq!(
            extraction.body,
            vec!["Chapter one begins with a sentence that", "continues here."]
        );
        assert_eq!(
            extraction.footnotes,
            vec![FootnoteEntry::new(1, "[1] A footnote at the bottom.")]
        );
        assert_eq!(extraction.discarded, 1);
        assert_eq!(extraction.page_count, 2);
    }

    #[test]
    fn test_page_selection() {
        let options = ExtractOptions::new().with_pages(PageSelection::Pages(vec![2]));
        let extractor =
            PdfExtractor::from_bytes_with_options(&build_pdf(&[PAGE_ONE, PAGE_TWO]), options)
                .unwrap();
        let extraction = extractor.extract().unwrap();
        assert_eq!(extraction.body, vec!["continues here."]);
        assert!(extraction.footnotes.is_empty());
    }

    #[test]
    fn test_page_list_read_in_document_order() {
        let options = ExtractOptions::new().with_pages(PageSelection::parse("2,1").unwrap());
        let extractor =
            PdfExtractor::from_bytes_with_options(&build_pdf(&[PAGE_ONE, PAGE_TWO]), options)
                .unwrap();
        let extraction = extractor.extract().unwrap();
        assert_eq!(
            extraction.body,
            vec!["Chapter one begins with a sentence that", "continues here."]
        );
    }

    #[test]
    fn test_page_out_of_range() {
        let options = ExtractOptions::new().with_pages(PageSelection::Range(1..=5));
        let extractor =
            PdfExtractor::from_bytes_with_options(&build_pdf(&[PAGE_ONE]), options).unwrap();
        assert!(matches!(
            extractor.fragments(),
            Err(Error::PageOutOfRange(5, 1))
        ));
    }

    #[test]
    fn test_classifier_options_applied() {
        let options = ExtractOptions::new()
            .with_classifier(ClassifierConfig::new().with_max_footnote_chars(10));
        let extractor =
            PdfExtractor::from_bytes_with_options(&build_pdf(&[PAGE_ONE]), options).unwrap();
        let extraction = extractor.extract().unwrap();
        assert!(extraction.footnotes.is_empty());
        assert_eq!(extraction.body.len(), 2);
    }
}
