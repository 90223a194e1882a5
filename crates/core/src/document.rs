//! Assembly of handoff sections into the final document, plus run metrics.

use serde::Serialize;

use crate::strategy::Mode;

/// One block of the handoff document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Full Markdown heading line, e.g. `## Files Referenced`.
    pub heading: Option<String>,
    pub body: String,
}

impl Section {
    pub fn titled(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            body: body.into(),
        }
    }

    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            heading: None,
            body: body.into(),
        }
    }

    fn render(&self) -> String {
        match &self.heading {
            Some(heading) if self.body.is_empty() => heading.clone(),
            Some(heading) => format!("{}\n\n{}", heading, self.body),
            None => self.body.clone(),
        }
    }
}

/// Ordered collection of sections.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section) -> &mut Self {
        self.sections.push(section);
        self
    }

    /// Push a section only when present.
    pub fn push_opt(&mut self, section: Option<Section>) -> &mut Self {
        if let Some(section) = section {
            self.sections.push(section);
        }
        self
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Render all sections separated by a single blank line.
    pub fn render(&self) -> String {
        let mut out = self
            .sections
            .iter()
            .map(Section::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }
}

/// Sizes and counts describing one compaction run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompactionMetrics {
    pub mode: Mode,
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub total_turns: usize,
    pub summarized_turns: usize,
    pub verbatim_turns: usize,
    pub compression_ratio: f64,
}

impl CompactionMetrics {
    pub fn new(
        mode: Mode,
        input_bytes: usize,
        output_bytes: usize,
        summarized_turns: usize,
        verbatim_turns: usize,
    ) -> Self {
        let compression_ratio = if input_bytes == 0 {
            0.0
        } else {
            1.0 - output_bytes as f64 / input_bytes as f64
        };
        Self {
            mode,
            input_bytes,
            output_bytes,
            total_turns: summarized_turns + verbatim_turns,
            summarized_turns,
            verbatim_turns,
            compression_ratio,
        }
    }
}

/// The finished handoff: sections, rendered text and metrics.
#[derive(Debug, Clone)]
pub struct CompactionResult {
    /// Title of the source conversation.
    pub title: String,
    pub sections: Vec<Section>,
    pub document: String,
    pub metrics: CompactionMetrics,
}

impl CompactionResult {
    /// Render the document and compute metrics against `input_bytes`.
    pub fn assemble(
        title: &str,
        document: Document,
        mode: Mode,
        input_bytes: usize,
        summarized_turns: usize,
        verbatim_turns: usize,
    ) -> Self {
        let rendered = document.render();
        let metrics = CompactionMetrics::new(
            mode,
            input_bytes,
            rendered.len(),
            summarized_turns,
            verbatim_turns,
        );
        Self {
            title: title.to_string(),
            sections: document.into_sections(),
            document: rendered,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_with_single_blank_line() {
        let mut doc = Document::new();
        doc.push(Section::plain("# Title"))
            .push_opt(None)
            .push(Section::titled("## Files", "- `a.rs`"))
            .push(Section::titled("## Empty", ""));
        assert_eq!(doc.render(), "# Title\n\n## Files\n\n- `a.rs`\n\n## Empty\n");
        assert_eq!(doc.sections().len(), 3);
    }

    #[test]
    fn test_compression_ratio() {
        let m = CompactionMetrics::new(Mode::Heuristic, 1000, 250, 0, 4);
        assert!((m.compression_ratio - 0.75).abs() < 1e-9);
        assert_eq!(m.total_turns, 4);
    }

    #[test]
    fn test_compression_ratio_zero_input() {
        let m = CompactionMetrics::new(Mode::Assisted, 0, 250, 1, 1);
        assert_eq!(m.compression_ratio, 0.0);
    }

    #[test]
    fn test_assemble_measures_rendered_bytes() {
        let mut doc = Document::new();
        doc.push(Section::plain("héllo"));
        let result = CompactionResult::assemble("Greeting", doc, Mode::Heuristic, 100, 0, 0);
        assert_eq!(result.title, "Greeting");
        assert_eq!(result.document, "héllo\n");
        assert_eq!(result.metrics.output_bytes, 7);
        assert_eq!(result.sections.len(), 1);
    }
}
