//! Pipeline stages for document text extraction.
//!
//! Each submodule implements exactly one step. The DJVU path uses the most
//! of them; the other formats reuse a subset.
//!
//! ## Data Flow
//!
//! ```text
//! DJVU: input ──▶ djvu ──▶ render ──▶ ocr ──▶ assemble
//!                (ddjvu)  (pdfium)  (tesseract)
//! PDF:  input ──▶ pdf_text ──────────────────▶ assemble
//! DOC:  input ──▶ doc (soffice) ──▶ docx ────▶ assemble
//! DOCX: input ──▶ docx ──────────────────────▶ assemble
//! ```
//!
//! 1. [`input`]    — canonicalise the user-supplied path or URL to a local file
//! 2. [`scratch`]  — per-invocation working directory, removed on drop
//! 3. [`tool`]     — run an external binary with a timeout and exit-code check
//! 4. [`djvu`]     — DJVU → PDF via DjVuLibre's `ddjvu`
//! 5. [`render`]   — rasterise every PDF page to `page_<index>.png`
//! 6. [`ocr`]      — image → text, one page at a time, in page order
//! 7. [`pdf_text`] — read the PDF text layer directly
//! 8. [`docx`]     — walk the body paragraphs of `word/document.xml`
//! 9. [`doc`]      — DOC → DOCX via LibreOffice, then [`docx`]

pub mod djvu;
pub mod doc;
pub mod docx;
pub mod input;
pub mod ocr;
pub mod pdf_text;
pub mod render;
pub mod scratch;
pub mod tool;
