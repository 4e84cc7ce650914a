//! Input format detection.
//!
//! The extension picks the candidate format; the first bytes confirm it.
//! A file whose magic bytes contradict its extension is reported as
//! corrupt rather than handed to a decoder that will fail less clearly.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// `%PDF`
const PDF_MAGIC: &[u8] = b"%PDF";
/// DjVu files open with an IFF85 header: `AT&TFORM`.
const DJVU_MAGIC: &[u8] = b"AT&TFORM";
/// Local file header of a ZIP archive (DOCX is a ZIP container).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE2 / Compound File Binary signature used by Word 97-2003.
pub(crate) const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Document formats the crate can extract text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Scanned DjVu document; text comes from OCR.
    Djvu,
    /// Word 97-2003 binary document.
    Doc,
    /// Office Open XML word-processing document.
    Docx,
    /// PDF with a text layer.
    Pdf,
}

impl DocumentFormat {
    /// Guess the format from a file extension, case-insensitively.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "djvu" | "djv" => Some(DocumentFormat::Djvu),
            "doc" => Some(DocumentFormat::Doc),
            "docx" => Some(DocumentFormat::Docx),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Guess the format from leading bytes.
    ///
    /// A bare ZIP signature is reported as DOCX; nothing else here is ZIP.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(DJVU_MAGIC) {
            Some(DocumentFormat::Djvu)
        } else if bytes.starts_with(ZIP_MAGIC) {
            Some(DocumentFormat::Docx)
        } else if bytes.starts_with(CFB_MAGIC) {
            Some(DocumentFormat::Doc)
        } else {
            None
        }
    }

    /// Detect the format of an existing file.
    ///
    /// Extension first, magic bytes as confirmation; with no recognised
    /// extension the magic bytes decide alone. A `.doc` name with unknown
    /// leading bytes is accepted as DOC, since the converter handles more
    /// than the binary format.
    pub fn detect(path: &Path) -> Result<Self, ExtractError> {
        let head = read_head(path)?;
        let by_magic = Self::from_magic(&head);

        match (Self::from_extension(path), by_magic) {
            (Some(ext), Some(magic)) if ext == magic => Ok(ext),
            (Some(ext), Some(magic)) => Err(ExtractError::CorruptFormat {
                path: path.to_path_buf(),
                format: ext.label(),
                detail: format!("content looks like {}", magic.label()),
            }),
            // RTF, HTML and text are routinely saved as .doc; soffice reads them.
            (Some(DocumentFormat::Doc), None) => Ok(DocumentFormat::Doc),
            (Some(ext), None) => Err(ExtractError::CorruptFormat {
                path: path.to_path_buf(),
                format: ext.label(),
                detail: format!("unrecognised leading bytes {:02X?}", &head),
            }),
            (None, Some(magic)) => Ok(magic),
            (None, None) => Err(ExtractError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Djvu => "djvu",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// Upper-case display name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Djvu => "DJVU",
            DocumentFormat::Doc => "DOC",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Pdf => "PDF",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "djvu" | "djv" => Ok(DocumentFormat::Djvu),
            "doc" => Ok(DocumentFormat::Doc),
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            other => Err(format!("unknown format '{other}' (expected djvu, doc, docx, pdf)")),
        }
    }
}

/// Read up to 8 leading bytes; shorter files yield what they have.
fn read_head(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let file = std::fs::File::open(path).map_err(|e| ExtractError::from_io(path, e))?;
    let mut head = Vec::with_capacity(8);
    file.take(8)
        .read_to_end(&mut head)
        .map_err(|e| ExtractError::from_io(path, e))?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn file_with(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_extension(Path::new("Scan.DJVU")),
            Some(DocumentFormat::Djvu)
        );
        assert_eq!(
            DocumentFormat::from_extension(Path::new("a.Docx")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_extension(Path::new("a.txt")), None);
        assert_eq!(DocumentFormat::from_extension(Path::new("noext")), None);
    }

    #[test]
    fn magic_detection() {
        assert_eq!(
            DocumentFormat::from_magic(b"%PDF-1.7"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_magic(b"AT&TFORM\0\0"),
            Some(DocumentFormat::Djvu)
        );
        assert_eq!(
            DocumentFormat::from_magic(b"PK\x03\x04rest"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_magic(CFB_MAGIC), Some(DocumentFormat::Doc));
        assert_eq!(DocumentFormat::from_magic(b"plain"), None);
    }

    #[test]
    fn detect_agreeing_extension_and_magic() {
        let f = file_with(".pdf", b"%PDF-1.4\n");
        assert_eq!(DocumentFormat::detect(f.path()).unwrap(), DocumentFormat::Pdf);
    }

    #[test]
    fn detect_rejects_mismatch() {
        let f = file_with(".pdf", b"Test PDF content");
        let err = DocumentFormat::detect(f.path()).unwrap_err();
        assert!(matches!(err, ExtractError::CorruptFormat { format: "PDF", .. }));
    }

    #[test]
    fn doc_extension_accepts_rtf_and_text() {
        let rtf = file_with(".doc", br"{\rtf1\ansi Hello}");
        assert_eq!(DocumentFormat::detect(rtf.path()).unwrap(), DocumentFormat::Doc);
        let text = file_with(".doc", "Текст для проверки.".as_bytes());
        assert_eq!(DocumentFormat::detect(text.path()).unwrap(), DocumentFormat::Doc);
    }

    #[test]
    fn detect_without_extension_uses_magic() {
        let f = file_with("", CFB_MAGIC);
        assert_eq!(DocumentFormat::detect(f.path()).unwrap(), DocumentFormat::Doc);
    }

    #[test]
    fn detect_unknown() {
        let f = file_with(".bin", b"????????");
        assert!(matches!(
            DocumentFormat::detect(f.path()),
            Err(ExtractError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn detect_missing_file() {
        let err = DocumentFormat::detect(Path::new("non_existent_file.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
        assert!(err.to_string().contains("non_existent_file.pdf"));
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("DjVu".parse::<DocumentFormat>().unwrap(), DocumentFormat::Djvu);
        assert!("txt".parse::<DocumentFormat>().is_err());
    }
}
