use crate::ast::*;

/// Serializer flattens a Document back into a field value
///
/// Output is canonical: marks always nest in the same order
/// (color, bold, italic, underline, code), so two equal documents
/// serialize to the same string. A document with no structure beyond
/// one plain paragraph is written as escaped plain text.
pub struct Serializer {
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Serialize a Document to its field encoding
    pub fn serialize(mut self, doc: &Document) -> String {
        if doc.is_plain() {
            return escape_html(&doc.to_plain_text());
        }

        for block in &doc.blocks {
            self.serialize_block(block);
        }
        self.output
    }

    fn serialize_block(&mut self, block: &Block) {
        let tag = block.kind.tag();
        if block.align == Align::Left {
            self.output.push_str(&format!("<{}>", tag));
        } else {
            self.output.push_str(&format!(
                "<{} style=\"text-align:{}\">",
                tag,
                block.align.as_css()
            ));
        }

        for child in &block.children {
            match child {
                Inline::Text(run) => self.serialize_run(run),
                Inline::Link(link) => {
                    self.output
                        .push_str(&format!("<a href=\"{}\">", escape_html(&link.url)));
                    for run in &link.children {
                        self.serialize_run(run);
                    }
                    self.output.push_str("</a>");
                }
            }
        }

        self.output.push_str(&format!("</{}>", tag));
    }

    fn serialize_run(&mut self, run: &TextRun) {
        if run.is_empty() {
            return;
        }

        let mut closing = Vec::new();
        if let Some(color) = &run.marks.color {
            self.output
                .push_str(&format!("<span style=\"color:{}\">", escape_html(color)));
            closing.push("</span>");
        }
        for (enabled, open, close) in [
            (run.marks.bold, "<strong>", "</strong>"),
            (run.marks.italic, "<em>", "</em>"),
            (run.marks.underline, "<u>", "</u>"),
            (run.marks.code, "<code>", "</code>"),
        ] {
            if enabled {
                self.output.push_str(open);
                closing.push(close);
            }
        }

        self.output
            .push_str(&escape_html(&run.text).replace('\n', "<br>"));

        for close in closing.into_iter().rev() {
            self.output.push_str(close);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a Document to its field encoding
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

impl Document {
    /// Flatten to the field value handed to the binding layer
    pub fn to_field_text(&self) -> String {
        serialize(self)
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
