//! Document-to-text entry point.

use std::io::Read;

use bytes::Bytes;
use tracing::info;

use super::pipeline::{PageRange, Pipeline, PdfRangeExtractor, RangeExtractor};
use crate::document::PDFDocument;
use crate::error::Result;

/// What is known about an input stream before it is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub mimetype: Option<String>,
    /// File extension including the leading dot, e.g. `.pdf`.
    pub extension: Option<String>,
    pub filename: Option<String>,
    pub url: Option<String>,
}

impl StreamInfo {
    pub fn from_path(path: &std::path::Path) -> Self {
        Self {
            extension: path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy())),
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionResult {
    pub text: String,
    pub title: Option<String>,
    /// Page ranges whose text is missing from `text`.
    pub incomplete_ranges: Vec<PageRange>,
}

impl ConversionResult {
    pub fn is_partial(&self) -> bool {
        !self.incomplete_ranges.is_empty()
    }
}

/// Converts PDF input to text through a shared extraction pipeline.
///
/// The document is opened with the range extractor's password, so the page
/// count and every range see the same decrypted document.
pub struct PdfConverter<E: RangeExtractor = PdfRangeExtractor> {
    pipeline: Pipeline<E>,
}

impl<E: RangeExtractor> PdfConverter<E> {
    pub fn new(pipeline: Pipeline<E>) -> Self {
        Self { pipeline }
    }

    pub fn password(&self) -> &str {
        self.pipeline.extractor().password()
    }

    pub fn pipeline(&self) -> &Pipeline<E> {
        &self.pipeline
    }

    /// Whether the stream looks like a PDF, by extension or MIME type.
    pub fn accepts(&self, info: &StreamInfo) -> bool {
        let by_extension = info
            .extension
            .as_deref()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"));
        let by_mimetype = info.mimetype.as_deref().is_some_and(|mime| {
            mime.get(..15)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("application/pdf"))
        });
        by_extension || by_mimetype
    }

    /// Read the whole input and extract its text.
    ///
    /// Fails only when the input cannot be read or parsed as a document;
    /// trouble within individual page ranges yields a partial result.
    pub fn convert<R: Read>(&self, mut reader: R, info: &StreamInfo) -> Result<ConversionResult> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let data = Bytes::from(buf);

        let doc = PDFDocument::new(&data, self.password())?;
        let page_count = doc.page_count();
        let title = doc.title();
        drop(doc);

        info!(
            filename = info.filename.as_deref().unwrap_or("-"),
            page_count,
            bytes = data.len(),
            "converting document"
        );
        let extraction = self.pipeline.extract(data, page_count);
        Ok(ConversionResult {
            text: extraction.text,
            title,
            incomplete_ranges: extraction.incomplete_ranges,
        })
    }

    /// Release the pipeline's workers.
    pub fn shutdown(self) {
        self.pipeline.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::high_level::ExtractOptions;
    use crate::api::pipeline::PipelineConfig;

    fn converter() -> PdfConverter {
        let config = PipelineConfig {
            max_concurrent_threads: 1,
            ..PipelineConfig::default()
        };
        PdfConverter::new(Pipeline::new(config, PdfRangeExtractor::default()).unwrap())
    }

    #[test]
    fn test_accepts() {
        let conv = converter();
        let info = |ext: Option<&str>, mime: Option<&str>| StreamInfo {
            extension: ext.map(str::to_string),
            mimetype: mime.map(str::to_string),
            ..StreamInfo::default()
        };
        assert!(conv.accepts(&info(Some(".PDF"), None)));
        assert!(conv.accepts(&info(None, Some("Application/PDF; charset=binary"))));
        assert!(!conv.accepts(&info(Some(".txt"), Some("text/plain"))));
        assert!(!conv.accepts(&info(None, Some("application/p"))));
        assert!(!conv.accepts(&StreamInfo::default()));
    }

    #[test]
    fn test_from_path() {
        let info = StreamInfo::from_path(std::path::Path::new("/tmp/report.pdf"));
        assert_eq!(info.extension.as_deref(), Some(".pdf"));
        assert_eq!(info.filename.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_password_shared_with_ranges() {
        assert_eq!(converter().password(), "");
        let options = ExtractOptions {
            password: "s3cret".into(),
            ..ExtractOptions::default()
        };
        let conv = PdfConverter::new(
            Pipeline::new(PipelineConfig::default(), PdfRangeExtractor::new(options)).unwrap(),
        );
        assert_eq!(conv.password(), "s3cret");
        assert_eq!(conv.pipeline().extractor().options().password, "s3cret");
    }

    #[test]
    fn test_convert_unreadable_input() {
        let conv = converter();
        let result = conv.convert(&b"plain text"[..], &StreamInfo::default());
        assert!(result.is_err());
    }
}
