use std::io;
use std::path::Path;

use crate::tokens::Token;

/// Identifier for source files registered with the compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

impl FileId {
    pub const UNKNOWN: Self = FileId(usize::MAX);
}

impl Default for FileId {
    fn default() -> Self {
        FileId::UNKNOWN
    }
}

/// Captured line/column information (1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// A registered source file: raw path, text, line index, and the token
/// stream the host's lexer produced for it (trivia included).
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: FileId,
    path: String,
    source: String,
    line_starts: Vec<usize>,
    tokens: Vec<Token>,
    content_hash: [u8; 32],
}

impl SourceFile {
    #[must_use]
    pub fn new(id: FileId, path: impl Into<String>, source: String, tokens: Vec<Token>) -> Self {
        let line_starts = compute_line_starts(&source);
        let content_hash = *blake3::hash(source.as_bytes()).as_bytes();
        Self {
            id,
            path: path.into(),
            source,
            line_starts,
            tokens,
            content_hash,
        }
    }

    /// Raw path string exactly as the host registered it.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Digest of the file's text, used by checksum-based locations.
    #[must_use]
    pub fn content_hash(&self) -> &[u8; 32] {
        &self.content_hash
    }

    /// Final path segment, for human-readable location displays.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of a 1-based line in characters, excluding the terminator.
    #[must_use]
    pub fn line_length(&self, line: usize) -> Option<usize> {
        let (start, end) = self.line_bounds(line)?;
        let text = self.source.get(start..end)?;
        let text = text.strip_suffix('\n').unwrap_or(text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        Some(text.chars().count())
    }

    /// Start and end byte offsets (exclusive) for a 1-based line.
    #[must_use]
    pub fn line_bounds(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.source.len());
        Some((start, end))
    }

    /// Byte offset of a 1-based (line, character) pair. The character must
    /// not exceed the line's length; callers validate bounds first.
    #[must_use]
    pub fn offset_at(&self, line: usize, character: usize) -> Option<usize> {
        let (start, end) = self.line_bounds(line)?;
        let text = self.source.get(start..end)?;
        let within = text
            .char_indices()
            .nth(character.checked_sub(1)?)
            .map(|(idx, _)| idx)?;
        Some(start + within)
    }

    /// Line/column (1-based) of a byte offset into the file.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> Option<LineCol> {
        if offset > self.source.len() {
            return None;
        }
        let index = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = *self.line_starts.get(index)?;
        let column = self
            .source
            .get(line_start..offset)
            .map(|text| text.chars().count())?;
        Some(LineCol {
            line: index + 1,
            column: column + 1,
        })
    }
}

/// Registry of every source file in the compilation.
#[derive(Clone, Debug, Default)]
pub struct SourceFiles {
    files: Vec<SourceFile>,
}

impl SourceFiles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(
        &mut self,
        path: impl Into<String>,
        source: impl Into<String>,
        tokens: Vec<Token>,
    ) -> FileId {
        let id = FileId(self.files.len());
        self.files
            .push(SourceFile::new(id, path, source.into(), tokens));
        id
    }

    /// Register a file by reading its text from disk. The token stream is
    /// attached later, once the host's lexer has run.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be read.
    pub fn load(&mut self, path: &Path) -> io::Result<FileId> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.add_file(path.to_string_lossy().into_owned(), source, Vec::new()))
    }

    pub fn set_tokens(&mut self, file_id: FileId, tokens: Vec<Token>) {
        if let Some(file) = self.files.get_mut(file_id.0) {
            file.tokens = tokens;
        }
    }

    #[must_use]
    pub fn get(&self, file_id: FileId) -> Option<&SourceFile> {
        self.files.get(file_id.0)
    }

    #[must_use]
    pub fn path(&self, file_id: FileId) -> Option<&str> {
        self.get(file_id).map(SourceFile::path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a SourceFiles {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn compute_line_starts(source: &str) -> Vec<usize> {
    let mut starts = Vec::with_capacity(source.lines().count() + 1);
    starts.push(0);
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            starts.push(idx + ch.len_utf8());
        }
    }
    starts
}
