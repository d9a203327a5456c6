use crate::syntax::pos::Span;
use crate::syntax::source::SourceDatabase;
use annotate_snippets::renderer::{AnsiColor, Color, Style};
use annotate_snippets::{Level, Renderer, Snippet};
use std::cell::RefCell;
use std::cmp::min;

/// Proof that an error has been reported to a [Diagnostics] collector.
///
/// Only [Diagnostics::report] creates this value, so holding one means the user will see the error.
#[must_use]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DiagnosticError(());

/// Collects the diagnostics reported during a single checking run.
pub struct Diagnostics {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            diagnostics: RefCell::new(vec![]),
        }
    }

    pub fn report(&self, diag: Diagnostic) -> DiagnosticError {
        self.diagnostics.borrow_mut().push(diag);
        DiagnosticError(())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

#[must_use]
#[derive(Debug)]
pub struct Diagnostic {
    pub title: String,
    /// In the order they were added, the first one is the primary location.
    pub annotations: Vec<Annotation>,
    pub footers: Vec<(Level, String)>,
}

#[derive(Debug, PartialEq)]
pub struct Annotation {
    pub level: Level,
    pub span: Span,
    pub label: String,
}

#[must_use]
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

#[derive(Debug, Copy, Clone)]
pub struct DiagnosticStringSettings {
    /// Number of lines shown before and after every annotated range.
    pub snippet_context_lines: usize,

    /// Annotations whose context ranges are at most this many lines apart share a snippet.
    /// `None` gives each annotation its own snippet.
    pub snippet_merge_max_distance: Option<usize>,

    /// Emit ANSI colors.
    pub styled: bool,
}

impl Default for DiagnosticStringSettings {
    fn default() -> Self {
        DiagnosticStringSettings {
            snippet_context_lines: 2,
            snippet_merge_max_distance: Some(3),
            styled: true,
        }
    }
}

/// A contiguous range of lines of a single file, with the annotations that fall inside it.
struct SnippetGroup<'a> {
    span: Span,
    annotations: Vec<&'a Annotation>,
}

impl Diagnostic {
    pub fn new(title: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder {
            diagnostic: Diagnostic {
                title: title.into(),
                annotations: vec![],
                footers: vec![],
            },
        }
    }

    pub fn to_string(&self, database: &SourceDatabase, settings: DiagnosticStringSettings) -> String {
        let groups = self.group_annotations(database, settings);

        let mut message = Level::Error.title(&self.title);

        for group in &groups {
            let file_info = &database[group.span.file];
            let offsets = &file_info.offsets;

            let lines = offsets.expand_span(group.span);
            let start_line_0 = lines.start.line_0.saturating_sub(settings.snippet_context_lines);
            let end_line_0 = min(
                lines.end.line_0 + settings.snippet_context_lines,
                offsets.line_count() - 1,
            );
            let start_byte = offsets.line_start(start_line_0);
            let end_byte = offsets.line_end(&file_info.source, end_line_0);

            let mut snippet = Snippet::source(&file_info.source[start_byte..end_byte])
                .origin(&file_info.path_raw)
                .line_start(start_line_0 + 1);
            for annotation in &group.annotations {
                let range = (annotation.span.start - start_byte)..(annotation.span.end - start_byte);
                snippet = snippet.annotation(annotation.level.span(range).label(&annotation.label));
            }

            message = message.snippet(snippet);
        }

        for (level, footer) in &self.footers {
            message = message.footer(level.title(footer));
        }

        let renderer = if settings.styled {
            Renderer::styled().emphasis(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::BrightRed))))
        } else {
            Renderer::plain()
        };
        let rendered = renderer.render(message).to_string();
        rendered
    }

    fn group_annotations(&self, database: &SourceDatabase, settings: DiagnosticStringSettings) -> Vec<SnippetGroup> {
        let mut groups: Vec<SnippetGroup> = vec![];

        for annotation in &self.annotations {
            let lines = database.expand_span(annotation.span);

            let existing = match settings.snippet_merge_max_distance {
                Some(max_distance) => groups.iter_mut().find(|group| {
                    match lines.distance_lines(database.expand_span(group.span)) {
                        Ok(distance) => distance <= 2 * settings.snippet_context_lines + max_distance,
                        Err(_) => false,
                    }
                }),
                None => None,
            };

            match existing {
                Some(group) => {
                    group.span = group.span.join(annotation.span);
                    group.annotations.push(annotation);
                }
                None => groups.push(SnippetGroup {
                    span: annotation.span,
                    annotations: vec![annotation],
                }),
            }
        }

        groups
    }
}

impl DiagnosticBuilder {
    pub fn add(mut self, level: Level, span: Span, label: impl Into<String>) -> Self {
        self.diagnostic.annotations.push(Annotation {
            level,
            span,
            label: label.into(),
        });
        self
    }

    pub fn add_error(self, span: Span, label: impl Into<String>) -> Self {
        self.add(Level::Error, span, label)
    }

    pub fn add_info(self, span: Span, label: impl Into<String>) -> Self {
        self.add(Level::Info, span, label)
    }

    pub fn footer(mut self, level: Level, footer: impl Into<String>) -> Self {
        self.diagnostic.footers.push((level, footer.into()));
        self
    }

    pub fn finish(self) -> Diagnostic {
        assert!(
            !self.diagnostic.annotations.is_empty(),
            "diagnostic `{}` has no annotations",
            self.diagnostic.title
        );
        self.diagnostic
    }
}
