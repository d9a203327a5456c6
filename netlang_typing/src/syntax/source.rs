use crate::syntax::pos::{FileId, LineOffsets, Span, SpanFull};

/// The source files a program was parsed from.
/// Only used to render diagnostics, the checker itself only sees spans.
pub struct SourceDatabase {
    files: Vec<FileSourceInfo>,
}

#[derive(Clone)]
pub struct FileSourceInfo {
    /// only intended for use in user-visible diagnostic messages
    pub path_raw: String,
    pub source: String,
    pub offsets: LineOffsets,
}

impl SourceDatabase {
    pub fn new() -> SourceDatabase {
        SourceDatabase { files: vec![] }
    }

    pub fn add_file(&mut self, path_raw: String, source: String) -> FileId {
        let offsets = LineOffsets::new(&source);
        let id = FileId(self.files.len());
        self.files.push(FileSourceInfo {
            path_raw,
            source,
            offsets,
        });
        id
    }

    pub fn expand_span(&self, span: Span) -> SpanFull {
        self[span.file].offsets.expand_span(span)
    }

    pub fn span_str(&self, span: Span) -> &str {
        &self[span.file].source[span.range_bytes()]
    }
}

impl std::ops::Index<FileId> for SourceDatabase {
    type Output = FileSourceInfo;
    fn index(&self, index: FileId) -> &Self::Output {
        &self.files[index.0]
    }
}
