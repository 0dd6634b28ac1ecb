//! Loading user files into the vector index

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::index::{Document, VectorIndex};

/// Description of one successfully loaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub name: String,
    pub file_type: String,
    pub num_pages: usize,
}

/// Result of an ingestion batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub success: bool,
    pub message: String,
    pub documents: Vec<DocumentMetadata>,
    pub failed_files: Vec<String>,
}

impl IngestOutcome {
    fn failure(message: String, failed_files: Vec<String>) -> Self {
        Self {
            success: false,
            message,
            documents: Vec::new(),
            failed_files,
        }
    }
}

/// Why a single file could not be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadFailure {
    Pdf,
    Encoding,
    Word,
    Unsupported,
    Empty,
    NoValidContent,
    Processing,
}

impl LoadFailure {
    fn label(&self) -> &'static str {
        match self {
            LoadFailure::Pdf => "PDF error",
            LoadFailure::Encoding => "encoding error",
            LoadFailure::Word => "Word error",
            LoadFailure::Unsupported => "unsupported type",
            LoadFailure::Empty => "empty",
            LoadFailure::NoValidContent => "no valid content",
            LoadFailure::Processing => "processing error",
        }
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decode text as UTF-8, falling back to Latin-1
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn load_txt(path: &Path) -> Result<Vec<String>, LoadFailure> {
    let bytes = std::fs::read(path).map_err(|_| LoadFailure::Encoding)?;
    Ok(vec![decode_text(&bytes)])
}

async fn load_pdf(path: &Path) -> Result<Vec<String>, LoadFailure> {
    let path = path.to_path_buf();
    // pdf-extract may panic on malformed files; the blocking task contains it
    let pages = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&path))
        .await
        .map_err(|_| LoadFailure::Pdf)?
        .map_err(|_| LoadFailure::Pdf)?;
    Ok(pages)
}

static XML_PARAGRAPH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:tab\s*/>").unwrap());
static XML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Plain text from WordprocessingML body XML
fn word_xml_to_text(xml: &str) -> String {
    let with_breaks = XML_PARAGRAPH_END.replace_all(xml, "\n");
    unescape_xml(&XML_TAG.replace_all(&with_breaks, ""))
}

fn load_word(path: &Path) -> Result<Vec<String>, LoadFailure> {
    let file = File::open(path).map_err(|_| LoadFailure::Word)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|_| LoadFailure::Word)?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| LoadFailure::Word)?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|_| LoadFailure::Word)?;
    Ok(vec![word_xml_to_text(&xml)])
}

/// Extract text sections (pages) from one file
async fn load_file(path: &Path, extension: &str) -> Result<Vec<String>, LoadFailure> {
    if !path.is_file() {
        return Err(LoadFailure::Processing);
    }
    match extension {
        "pdf" => load_pdf(path).await,
        "txt" => load_txt(path),
        "docx" | "doc" => load_word(path),
        _ => Err(LoadFailure::Unsupported),
    }
}

/// Load files, chunk them and rebuild the index.
///
/// Individual file failures are collected and never abort the batch. The
/// index is only replaced when at least one valid chunk was embedded.
pub async fn ingest(paths: &[PathBuf], index: &mut VectorIndex) -> IngestOutcome {
    let mut documents: Vec<Document> = Vec::new();
    let mut metadata: Vec<DocumentMetadata> = Vec::new();
    let mut failed_files: Vec<String> = Vec::new();

    for path in paths {
        let name = display_name(path);
        let extension = extension_of(path);

        let sections = match load_file(path, &extension).await {
            Ok(sections) if sections.is_empty() => Err(LoadFailure::Empty),
            other => other,
        };
        let sections = match sections {
            Ok(sections) => sections,
            Err(failure) => {
                tracing::warn!("Failed to load {}: {}", name, failure.label());
                failed_files.push(format!("{} ({})", name, failure.label()));
                continue;
            }
        };

        let valid: Vec<String> = sections
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if valid.is_empty() {
            tracing::warn!("No valid content in {}", name);
            failed_files.push(format!("{} ({})", name, LoadFailure::NoValidContent.label()));
            continue;
        }

        // Same file name from another directory: cite the full path instead
        let source = if metadata.iter().any(|m| m.name == name) {
            path.display().to_string()
        } else {
            name
        };

        tracing::info!("Loaded {} pages from {}", valid.len(), source);
        metadata.push(DocumentMetadata {
            name: source.clone(),
            file_type: extension,
            num_pages: valid.len(),
        });
        documents.extend(valid.into_iter().map(|text| Document::new(text, source.clone())));
    }

    if documents.is_empty() {
        let mut message = "No valid documents were loaded".to_string();
        if !failed_files.is_empty() {
            message.push_str(&format!(". Failed files: {}", failed_files.join(", ")));
        }
        return IngestOutcome::failure(message, failed_files);
    }

    let passages = index.chunk_documents(&documents);
    if passages.is_empty() {
        return IngestOutcome::failure(
            "Documents were loaded but no valid text chunks could be created".into(),
            failed_files,
        );
    }

    let chunk_count = passages.len();
    if let Err(e) = index.build_from_passages(passages).await {
        tracing::warn!("Vectorization failed: {}", e);
        return IngestOutcome::failure(
            format!("Documents loaded but vectorization failed: {}", e),
            failed_files,
        );
    }

    tracing::info!("Created {} chunks from documents", chunk_count);
    let mut message = format!(
        "Successfully loaded {} documents with {} chunks",
        documents.len(),
        chunk_count
    );
    if !failed_files.is_empty() {
        message.push_str(&format!("\nFailed to load: {}", failed_files.join(", ")));
    }

    IngestOutcome {
        success: true,
        message,
        documents: metadata,
        failed_files,
    }
}
