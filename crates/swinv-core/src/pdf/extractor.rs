//! Positioned text extraction using lopdf and pdf-extract.

use std::borrow::Cow;

use lopdf::Document;
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, trace};

use super::{PageText, Result, TextLayer};
use crate::error::PdfError;

/// PDF text-layer reader.
///
/// The document is opened with lopdf (decrypting empty-password files and
/// dropping pages past the cap), then pdf-extract walks the content streams
/// and reports every glyph with its text rendering matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }
}

impl TextLayer for PdfExtractor {
    fn pages(&self, data: &[u8], max_pages: usize) -> Result<Vec<PageText>> {
        let raw = prepare_document(data, max_pages)?;

        let doc = pdf_extract::Document::load_mem(&raw)
            .map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut collector = FragmentCollector::new(max_pages);
        pdf_extract::output_doc(&doc, &mut collector)
            .map_err(|e| PdfError::TextExtraction(format!("{:?}", e)))?;

        let pages = collector.pages;
        debug!(
            "Read {} page(s), {} fragment(s)",
            pages.len(),
            pages.iter().map(|p| p.fragments.len()).sum::<usize>()
        );
        Ok(pages)
    }
}

/// Load the document, decrypt it if needed and cut it down to `max_pages`.
///
/// Returns the original bytes untouched when nothing had to change.
fn prepare_document(data: &[u8], max_pages: usize) -> Result<Cow<'_, [u8]>> {
    let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;
    let mut modified = false;

    // Handle PDFs with empty password encryption
    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");
        modified = true;
    }

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Err(PdfError::NoPages);
    }

    if page_numbers.len() > max_pages {
        let dropped: Vec<u32> = page_numbers
            .iter()
            .copied()
            .filter(|n| *n as usize > max_pages)
            .collect();
        debug!(
            "Document has {} pages, reading the first {}",
            page_numbers.len(),
            max_pages
        );
        doc.delete_pages(&dropped);
        modified = true;
    }

    if !modified {
        return Ok(Cow::Borrowed(data));
    }

    let mut rewritten = Vec::new();
    doc.save_to(&mut rewritten)
        .map_err(|e| PdfError::Parse(format!("Failed to save prepared PDF: {}", e)))?;
    Ok(Cow::Owned(rewritten))
}

/// How the next glyph relates to the run being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunJoin {
    /// Directly adjacent: append.
    Append,
    /// A small gap with no space glyph: append after a space.
    AppendWithSpace,
    /// Different baseline or far away: start a new fragment.
    Break,
}

/// Glyphs collected into one fragment.
#[derive(Debug, Clone)]
struct GlyphRun {
    text: String,
    y: f64,
    end_x: f64,
}

impl GlyphRun {
    fn join(&self, x: f64, y: f64, font_scale: f64) -> RunJoin {
        if (y - self.y).abs() >= 0.5 {
            return RunJoin::Break;
        }

        let gap = x - self.end_x;
        if gap < -0.5 * font_scale || gap > font_scale {
            RunJoin::Break
        } else if gap > 0.1 * font_scale && !self.text.ends_with(char::is_whitespace) {
            RunJoin::AppendWithSpace
        } else {
            RunJoin::Append
        }
    }
}

/// `OutputDev` sink turning glyph callbacks into page fragments.
struct FragmentCollector {
    max_pages: usize,
    pages: Vec<PageText>,
    current: Option<PageText>,
    run: Option<GlyphRun>,
}

impl FragmentCollector {
    fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            pages: Vec::new(),
            current: None,
            run: None,
        }
    }

    fn flush_run(&mut self) {
        if let (Some(run), Some(page)) = (self.run.take(), self.current.as_mut()) {
            if !run.text.trim().is_empty() {
                page.push(run.text, run.y);
            }
        }
    }
}

impl OutputDev for FragmentCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.run = None;
        self.current = if page_num as usize <= self.max_pages {
            Some(PageText::new(page_num, media_box.ury - media_box.lly))
        } else {
            None
        };
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush_run();
        if let Some(page) = self.current.take() {
            trace!("Page {}: {} fragment(s)", page.number, page.fragments.len());
            self.pages.push(page);
        }
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if self.current.is_none() {
            return Ok(());
        }

        let font_scale = font_size * (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let (x, y) = (trm.m31, trm.m32);
        let end_x = x + width * font_scale;

        let join = self
            .run
            .as_ref()
            .map(|run| run.join(x, y, font_scale))
            .unwrap_or(RunJoin::Break);

        match (join, self.run.as_mut()) {
            (RunJoin::Append, Some(run)) => {
                run.text.push_str(char);
                run.end_x = end_x;
            }
            (RunJoin::AppendWithSpace, Some(run)) => {
                run.text.push(' ');
                run.text.push_str(char);
                run.end_x = end_x;
            }
            _ => {
                self.flush_run();
                self.run = Some(GlyphRun {
                    text: char.to_string(),
                    y,
                    end_x,
                });
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}
