//! Line reconstruction by vertical-coordinate clustering.

use std::collections::BTreeMap;

use tracing::debug;

use super::{PageText, Result, TextLayer};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// A reconstructed text line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Global vertical position: the page-local bucket plus the page offset.
    ///
    /// Within a page larger values are read first; every line of a later
    /// page has a larger value than every line of an earlier page.
    pub y: f64,
    /// Page number (1-indexed).
    pub page: u32,
    /// Line text: the bucket's fragments joined by single spaces.
    pub text: String,
}

impl TextLine {
    pub fn new(y: f64, page: u32, text: impl Into<String>) -> Self {
        Self {
            y,
            page,
            text: text.into(),
        }
    }
}

/// Groups positioned fragments into ordered, page-aware lines.
#[derive(Debug, Clone, Default)]
pub struct LineReconstructor {
    config: PdfConfig,
}

impl LineReconstructor {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Read `data` through `layer` and reconstruct its lines.
    ///
    /// Fails when the document cannot be parsed or when none of the
    /// processed pages yields a single line of text.
    pub fn read<L: TextLayer>(&self, layer: &L, data: &[u8]) -> Result<Vec<TextLine>> {
        let pages = layer.pages(data, self.config.max_pages)?;
        let lines = self.reconstruct(&pages);

        if lines.is_empty() {
            return Err(PdfError::NoText(pages.len()));
        }
        Ok(lines)
    }

    /// Turn pages of fragments into lines in reading order.
    pub fn reconstruct(&self, pages: &[PageText]) -> Vec<TextLine> {
        let bucket = if self.config.line_bucket > 0.0 {
            self.config.line_bucket
        } else {
            1.0
        };

        let mut lines = Vec::new();
        let mut offset = 0.0;

        for page in pages.iter().take(self.config.max_pages) {
            // Bucket index -> fragments in emission order.
            let mut buckets: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
            for fragment in &page.fragments {
                if fragment.text.trim().is_empty() {
                    continue;
                }
                let key = (fragment.y / bucket).round() as i64;
                buckets.entry(key).or_default().push(fragment.text.as_str());
            }

            let mut top = page.height;
            let before = lines.len();

            for (key, texts) in buckets.iter().rev() {
                let local_y = *key as f64 * bucket;
                top = top.max(local_y);

                let text = texts.join(" ");
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                lines.push(TextLine::new(local_y + offset, page.number, text));
            }

            debug!(
                "Page {}: {} fragment(s) -> {} line(s)",
                page.number,
                page.fragments.len(),
                lines.len() - before
            );

            offset += top + self.config.page_padding;
        }

        lines
    }
}

/// Join line texts with newlines.
pub fn full_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
