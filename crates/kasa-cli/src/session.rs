//! Per-session, per-language chat transcripts
//!
//! Each session writes one plain text file per answer language,
//! `<chats_dir>/<session_id>_<language>.txt`, with one `Role: content` line
//! per record. Files are only ever appended to.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use kasa_agent::ContextMode;

/// Who wrote a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRole {
    User,
    Ai,
}

impl RecordRole {
    /// Capitalized label written to the transcript
    pub fn label(&self) -> &'static str {
        match self {
            RecordRole::User => "User",
            RecordRole::Ai => "Ai",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(RecordRole::User),
            "ai" | "assistant" => Some(RecordRole::Ai),
            _ => None,
        }
    }
}

/// One displayed chat message with its translations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub role: RecordRole,
    /// Text in the base language
    pub content: String,
    /// Translated text keyed by language code
    pub translations: BTreeMap<String, String>,
    /// Context mode the record was produced in
    pub mode: Option<ContextMode>,
}

impl ChatRecord {
    pub fn new(role: RecordRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            translations: BTreeMap::new(),
            mode: None,
        }
    }

    pub fn with_translation(mut self, language: &str, text: impl Into<String>) -> Self {
        self.translations.insert(language.to_string(), text.into());
        self
    }

    pub fn with_mode(mut self, mode: ContextMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Text for a language, falling back to the base content
    pub fn text_for(&self, language: &str) -> &str {
        self.translations
            .get(language)
            .map(String::as_str)
            .unwrap_or(&self.content)
    }
}

/// A session found on disk
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub id: String,
    pub languages: Vec<String>,
    pub modified: Option<DateTime<Local>>,
}

impl StoredSession {
    /// Format the modification time for display
    pub fn modified_display(&self) -> String {
        self.modified
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Flat-file chat transcript store
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

/// Short random id for a new session
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Split `<id>_<lang>.txt` into its parts
fn parse_file_name(path: &Path) -> Option<(String, String)> {
    if path.extension().and_then(|e| e.to_str()) != Some("txt") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (id, language) = stem.rsplit_once('_')?;
    if id.is_empty() || language.is_empty() {
        return None;
    }
    Some((id.to_string(), language.to_string()))
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Transcript path for a session and language
    pub fn path(&self, session_id: &str, language: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.txt", session_id, language))
    }

    /// Append records to the session's transcript for `language`
    pub fn save(
        &self,
        session_id: &str,
        language: &str,
        records: &[ChatRecord],
    ) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(session_id, language))?;
        for record in records {
            writeln!(file, "{}: {}", record.role.label(), record.text_for(language))?;
        }
        file.flush()
    }

    /// Read back a transcript. A missing file is an empty history.
    ///
    /// Lines without a known `Role: ` prefix are skipped.
    pub fn load(&self, session_id: &str, language: &str) -> std::io::Result<Vec<ChatRecord>> {
        let path = self.path(session_id, language);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let records = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let (role, text) = line.split_once(": ")?;
                let role = RecordRole::parse(role)?;
                let text = text.trim();
                Some(ChatRecord::new(role, text).with_translation(language, text))
            })
            .collect();
        Ok(records)
    }

    /// Delete one language's transcript, or every transcript of the session.
    /// Returns how many files were removed.
    pub fn clear(&self, session_id: &str, language: Option<&str>) -> std::io::Result<usize> {
        if let Some(language) = language {
            let path = self.path(session_id, language);
            if !path.exists() {
                return Ok(0);
            }
            fs::remove_file(path)?;
            return Ok(1);
        }

        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if let Some((id, _)) = parse_file_name(&path) {
                if id == session_id {
                    fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    /// List stored sessions, most recently modified first
    pub fn list_sessions(&self) -> std::io::Result<Vec<StoredSession>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut sessions: BTreeMap<String, StoredSession> = BTreeMap::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some((id, language)) = parse_file_name(&path) else {
                continue;
            };
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Local>::from);

            let session = sessions.entry(id.clone()).or_insert_with(|| StoredSession {
                id,
                languages: Vec::new(),
                modified: None,
            });
            session.languages.push(language);
            session.languages.sort();
            session.modified = session.modified.max(modified);
        }

        let mut sessions: Vec<StoredSession> = sessions.into_values().collect();
        sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(sessions)
    }
}
