use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConsoleError, ConsoleResult};
use crate::values::row_string;

pub const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PreviewKind {
    Image,
    Pdf,
}

/// What the preview pane shows. PDFs always render as an embed, never as an
/// image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Preview {
    Image {
        src: String,
    },
    Embed {
        src: String,
        mime: String,
        width: String,
        height: String,
    },
}

impl Preview {
    pub fn placeholder(src: &str) -> Self {
        Preview::Image {
            src: src.to_string(),
        }
    }

    /// Collapsed embed left behind when there is no PDF to show.
    pub fn empty_pdf() -> Self {
        Preview::Embed {
            src: String::new(),
            mime: PDF_MIME.to_string(),
            width: "0px".to_string(),
            height: "0px".to_string(),
        }
    }

    pub fn pdf(src: String) -> Self {
        Preview::Embed {
            src,
            mime: PDF_MIME.to_string(),
            width: "100%".to_string(),
            height: "500px".to_string(),
        }
    }

    pub fn kind(&self) -> PreviewKind {
        match self {
            Preview::Image { .. } => PreviewKind::Image,
            Preview::Embed { .. } => PreviewKind::Pdf,
        }
    }
}

/// Local file picked for upload but not sent yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }

    pub fn read(path: &Path) -> ConsoleResult<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self { name, bytes })
    }

    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn kind(&self) -> PreviewKind {
        if self.extension() == "pdf" {
            PreviewKind::Pdf
        } else {
            PreviewKind::Image
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self.extension().as_str() {
            "pdf" => PDF_MIME,
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            "svg" => "image/svg+xml",
            _ => "application/octet-stream",
        }
    }

    /// Immediate preview of the local bytes, before any upload.
    pub fn preview(&self) -> Preview {
        let src = data_url(self.content_type(), &self.bytes);
        match self.kind() {
            PreviewKind::Pdf => Preview::pdf(src),
            PreviewKind::Image => Preview::Image { src },
        }
    }
}

/// A stored record's file is a PDF when the record says so or its name
/// mentions `pdf` in any case.
pub fn record_kind(record: &Value) -> PreviewKind {
    let flagged = record.get("pdf").and_then(Value::as_bool).unwrap_or(false);
    let named = row_string(record, "fileName").to_lowercase().contains("pdf");
    if flagged || named {
        PreviewKind::Pdf
    } else {
        PreviewKind::Image
    }
}

/// Item of the raw JSON array returned by the PDF download endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfItem {
    pub byte_array: String,
    #[serde(rename = "type", default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Decoded PDF document ready to embed or hand to a system viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfBlob {
    pub file_name: Option<String>,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl PdfBlob {
    pub fn decode(item: &PdfItem) -> ConsoleResult<Self> {
        let bytes = decode_b64(item.byte_array.trim())?;
        Ok(Self {
            file_name: item.file_name.clone(),
            mime: PDF_MIME,
            bytes,
        })
    }

    pub fn data_url(&self) -> String {
        data_url(self.mime, &self.bytes)
    }

    pub fn preview(&self) -> Preview {
        Preview::pdf(self.data_url())
    }
}

/// Decodes every item; the last one is what ends up displayed. An empty
/// response leaves the collapsed embed.
pub fn pdf_preview(items: &[PdfItem]) -> ConsoleResult<(Preview, Option<PdfBlob>)> {
    let mut shown = None;
    for item in items {
        shown = Some(PdfBlob::decode(item)?);
    }
    Ok(match shown {
        Some(blob) => (blob.preview(), Some(blob)),
        None => (Preview::empty_pdf(), None),
    })
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", encode_b64(bytes))
}

fn decode_b64(value: &str) -> ConsoleResult<Vec<u8>> {
    B64.decode(value)
        .map_err(|err| ConsoleError::Decode(format!("invalid base64 document: {err}")))
}

fn encode_b64(bytes: &[u8]) -> String {
    B64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_pdf_previews_as_embed() {
        let file = StagedFile::new("Contract.PDF", b"%PDF-1.4".to_vec());
        assert_eq!(file.kind(), PreviewKind::Pdf);
        match file.preview() {
            Preview::Embed { src, mime, .. } => {
                assert_eq!(mime, PDF_MIME);
                assert_eq!(src, "data:application/pdf;base64,JVBERi0xLjQ=");
            }
            other => panic!("expected embed, got {other:?}"),
        }
    }

    #[test]
    fn local_image_previews_as_image() {
        let file = StagedFile::new("photo.jpg", vec![0xff, 0xd8]);
        assert_eq!(file.content_type(), "image/jpeg");
        assert!(matches!(file.preview(), Preview::Image { .. }));
    }

    #[test]
    fn record_kind_checks_flag_then_name() {
        assert_eq!(record_kind(&json!({"pdf": true, "fileName": "a.png"})), PreviewKind::Pdf);
        assert_eq!(record_kind(&json!({"fileName": "SCAN_PDF_01.bin"})), PreviewKind::Pdf);
        assert_eq!(record_kind(&json!({"fileName": "scan.png"})), PreviewKind::Image);
        assert_eq!(record_kind(&json!({})), PreviewKind::Image);
    }

    #[test]
    fn empty_download_collapses_the_embed() {
        let (preview, blob) = pdf_preview(&[]).expect("empty");
        assert_eq!(preview, Preview::empty_pdf());
        assert!(blob.is_none());
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let item = PdfItem {
            byte_array: "***".to_string(),
            file_type: None,
            file_name: None,
        };
        assert!(matches!(PdfBlob::decode(&item), Err(ConsoleError::Decode(_))));
    }
}
