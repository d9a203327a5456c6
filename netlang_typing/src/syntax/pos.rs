use std::cmp::{max, min};
use std::fmt::{Debug, Formatter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FileId(pub usize);

/// Minimal source code span, byte-based.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Span {
    pub file: FileId,
    /// inclusive
    pub start: usize,
    /// exclusive
    pub end: usize,
}

/// Expanded source code position.
///
/// The line and column are stored as zero-based,
/// whenever visible to the end user they should be displayed as one-based
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PosFull {
    pub byte: usize,
    pub line_0: usize,
    pub col_0: usize,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SpanFull {
    pub file: FileId,
    pub start: PosFull,
    pub end: PosFull,
}

impl FileId {
    pub const SINGLE: FileId = FileId(0);
}

impl Span {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {} after end {}", start, end);
        Span { file, start, end }
    }

    pub fn empty_at(file: FileId, byte: usize) -> Self {
        Span::new(file, byte, byte)
    }

    pub fn join(self, other: Span) -> Span {
        assert_eq!(self.file, other.file);
        Span::new(self.file, min(self.start, other.start), max(self.end, other.end))
    }

    pub fn range_bytes(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Copy, Clone)]
pub struct DifferentFile;

impl SpanFull {
    pub fn distance_lines(self, other: SpanFull) -> Result<usize, DifferentFile> {
        if self.file != other.file {
            return Err(DifferentFile);
        }

        if self.end.line_0 < other.start.line_0 {
            Ok(other.start.line_0 - self.end.line_0)
        } else if other.end.line_0 < self.start.line_0 {
            Ok(self.start.line_0 - other.end.line_0)
        } else {
            Ok(0)
        }
    }
}

// Short debug implementation, spans appear a lot in AST debug outputs.
impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Span([{}]:{}..{})", self.file.0, self.start, self.end)
    }
}

/// Byte offsets of the start of each line in a file.
#[derive(Debug, Clone)]
pub struct LineOffsets {
    total_bytes: usize,
    line_starts: Vec<usize>,
}

impl LineOffsets {
    pub fn new(src: &str) -> Self {
        let bytes = src.as_bytes();
        let mut line_starts = vec![0];

        for (i, &b) in bytes.iter().enumerate() {
            let is_line_end = match b {
                b'\n' => true,
                // "\r\n" only counts once, at the "\n"
                b'\r' => bytes.get(i + 1) != Some(&b'\n'),
                _ => false,
            };
            if is_line_end {
                line_starts.push(i + 1);
            }
        }

        LineOffsets { total_bytes: src.len(), line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn expand_byte(&self, byte: usize) -> PosFull {
        let line_0 = self.line_starts.binary_search(&byte).unwrap_or_else(|next_line_0| next_line_0 - 1);
        PosFull {
            byte,
            line_0,
            col_0: byte - self.line_starts[line_0],
        }
    }

    pub fn expand_span(&self, span: Span) -> SpanFull {
        SpanFull {
            file: span.file,
            start: self.expand_byte(span.start),
            end: self.expand_byte(span.end),
        }
    }

    pub fn line_start(&self, line_0: usize) -> usize {
        self.line_starts[line_0]
    }

    /// The end of the given line, excluding the line terminator.
    pub fn line_end(&self, src: &str, line_0: usize) -> usize {
        let next_start = self.line_starts.get(line_0 + 1).copied().unwrap_or(self.total_bytes);
        let line = &src.as_bytes()[self.line_starts[line_0]..next_start];
        let terminator_len = line.iter().rev().take_while(|&&b| b == b'\n' || b == b'\r').count();
        next_start - terminator_len
    }
}
