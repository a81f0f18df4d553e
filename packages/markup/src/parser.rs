use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;

/// What an open tag contributes while it is on the stack
#[derive(Debug, Clone)]
enum Element {
    Block,
    Mark(Mark),
    Link,
    /// Unknown or purely presentational tag; only its text is kept
    Transparent,
}

#[derive(Debug)]
struct OpenElement {
    tag: String,
    element: Element,
    pos: usize,
}

/// Parser for the rich-text field encoding
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    stack: Vec<OpenElement>,
    blocks: Vec<Block>,
    current: Option<Block>,
    link: Option<Link>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            stack: Vec::new(),
            blocks: Vec::new(),
            current: None,
            link: None,
        }
    }

    /// Parse a complete field value
    pub fn parse_document(&mut self) -> ParseResult<Document> {
        while !self.is_at_end() {
            let (token, span) = self.tokens[self.pos].clone();
            self.pos += 1;

            match token {
                Token::OpenTag(raw) => self.open_tag(&token, raw, span)?,
                Token::CloseTag(_) => {
                    let name = token.tag_name().unwrap_or_default();
                    self.close_tag(name, span)?;
                }
                Token::Entity(entity) => self.push_text(&decode_entity(entity)),
                Token::Text(text) => self.push_text(text),
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(ParseError::UnclosedTag {
                pos: open.pos,
                tag: open.tag.clone(),
            });
        }

        self.flush_block();
        Ok(Document::new(std::mem::take(&mut self.blocks)))
    }

    fn open_tag(&mut self, token: &Token<'src>, raw: &str, span: Range<usize>) -> ParseResult<()> {
        let name = token.tag_name().unwrap_or_default();
        let attributes = parse_attributes(raw, span.start)?;

        if name == "br" {
            self.push_text("\n");
            return Ok(());
        }
        if is_void(&name) || token.is_self_closing() {
            return Ok(());
        }

        if let Some(kind) = BlockKind::from_tag(&name) {
            if let Some(open) = self
                .stack
                .iter()
                .find(|open| !matches!(open.element, Element::Transparent))
            {
                return Err(ParseError::unexpected_token(
                    span.start,
                    format!("<{}>", name),
                    format!("blocks cannot be nested inside <{}>", open.tag),
                ));
            }

            self.flush_block();
            let align = style_value(&attributes, "text-align")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default();
            self.current = Some(Block {
                kind,
                align,
                children: Vec::new(),
            });
            self.stack.push(OpenElement {
                tag: name,
                element: Element::Block,
                pos: span.start,
            });
            return Ok(());
        }

        let element = match name.as_str() {
            "strong" | "b" => Element::Mark(Mark::Bold),
            "em" | "i" => Element::Mark(Mark::Italic),
            "u" => Element::Mark(Mark::Underline),
            "code" => Element::Mark(Mark::Code),
            "span" => match style_value(&attributes, "color") {
                Some(color) if !color.is_empty() => Element::Mark(Mark::Color(color)),
                _ => Element::Transparent,
            },
            "a" => {
                if self.link.is_some() {
                    return Err(ParseError::NestedLink { pos: span.start });
                }
                let href = attribute(&attributes, "href").ok_or_else(|| {
                    ParseError::invalid_attribute(span.start, "<a> requires an href attribute")
                })?;
                self.link = Some(Link::new(href, Vec::new()));
                Element::Link
            }
            _ => Element::Transparent,
        };

        self.stack.push(OpenElement {
            tag: name,
            element,
            pos: span.start,
        });
        Ok(())
    }

    fn close_tag(&mut self, name: String, span: Range<usize>) -> ParseResult<()> {
        if name == "br" || is_void(&name) {
            return Ok(());
        }

        let open = self.stack.pop().ok_or_else(|| {
            ParseError::unexpected_token(
                span.start,
                format!("</{}>", name),
                "closing tag without a matching opening tag",
            )
        })?;

        if open.tag != name {
            return Err(ParseError::MismatchedTag {
                pos: span.start,
                expected: open.tag,
                found: name,
            });
        }

        match open.element {
            Element::Block => self.flush_block(),
            Element::Link => {
                if let Some(link) = self.link.take() {
                    self.current_block().children.push(Inline::Link(link));
                }
            }
            Element::Mark(_) | Element::Transparent => {}
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        let run = TextRun::styled(text, self.current_marks());
        if let Some(link) = &mut self.link {
            link.children.push(run);
            return;
        }

        // Formatting whitespace between blocks
        if self.current.is_none() && text.contains('\n') && text.trim().is_empty() {
            return;
        }

        self.current_block().children.push(Inline::Text(run));
    }

    fn current_marks(&self) -> Marks {
        self.stack
            .iter()
            .filter_map(|open| match &open.element {
                Element::Mark(mark) => Some(mark),
                _ => None,
            })
            .fold(Marks::default(), |mut marks, mark| {
                marks.add(mark);
                marks
            })
    }

    /// Open block, or an implicit paragraph for text outside any block tag
    fn current_block(&mut self) -> &mut Block {
        self.current.get_or_insert_with(|| Block {
            kind: BlockKind::Paragraph,
            align: Align::Left,
            children: Vec::new(),
        })
    }

    fn flush_block(&mut self) {
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

/// Parse a field value strictly
pub fn parse(source: &str) -> ParseResult<Document> {
    let mut parser = Parser::new(source);
    parser.parse_document()
}

/// Parse a field value, falling back to the raw string as a single plain
/// paragraph when the encoding is malformed
pub fn parse_or_plain(source: &str) -> Document {
    match parse(source) {
        Ok(doc) => doc,
        Err(err) => {
            tracing::warn!(error = %err, "malformed rich text, falling back to plain text");
            Document::from_plain_text(source)
        }
    }
}

impl Document {
    /// Build the document for a stored field value (see [`parse_or_plain`])
    pub fn from_field_text(source: &str) -> Self {
        parse_or_plain(source)
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "hr" | "input" | "meta" | "link" | "area" | "base" | "col" | "embed" | "source" | "track" | "wbr"
    )
}

fn attribute(attributes: &[(String, String)], name: &str) -> Option<String> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}

/// Read one property out of an inline `style` attribute
fn style_value(attributes: &[(String, String)], property: &str) -> Option<String> {
    let style = attribute(attributes, "style")?;
    style.split(';').find_map(|declaration| {
        let (key, value) = declaration.split_once(':')?;
        if key.trim().eq_ignore_ascii_case(property) {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}

/// Parse the attributes of an open tag. `base` is the tag's byte offset.
fn parse_attributes(raw: &str, base: usize) -> ParseResult<Vec<(String, String)>> {
    let name_len = raw[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    let body_start = 1 + name_len;
    let body = raw[body_start..].trim_end_matches('>');

    let mut attributes = Vec::new();
    let mut chars = body.char_indices().peekable();

    loop {
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace() || *c == '/') {
            chars.next();
        }
        let Some(&(name_start, _)) = chars.peek() else {
            break;
        };

        let mut name = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':') {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(ParseError::invalid_attribute(
                base + body_start + name_start,
                "expected attribute name",
            ));
        }

        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }

        let mut value = String::new();
        if matches!(chars.peek(), Some((_, '='))) {
            chars.next();
            while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
                chars.next();
            }
            match chars.peek().copied() {
                Some((quote_pos, quote @ ('"' | '\''))) => {
                    chars.next();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            closed = true;
                            break;
                        }
                        value.push(c);
                    }
                    if !closed {
                        return Err(ParseError::invalid_attribute(
                            base + body_start + quote_pos,
                            format!("unterminated value for '{}'", name),
                        ));
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        attributes.push((name.to_ascii_lowercase(), decode_entities(&value)));
    }

    Ok(attributes)
}

fn decode_entities(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|(token, _)| match token {
            Token::Entity(entity) => decode_entity(entity),
            Token::OpenTag(s) | Token::CloseTag(s) | Token::Text(s) => s.to_string(),
        })
        .collect()
}

fn decode_entity(entity: &str) -> String {
    let inner = &entity[1..entity.len() - 1];
    let decoded = match inner {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            if let Some(hex) = inner.strip_prefix("#x").or_else(|| inner.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = inner.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };
    decoded
        .map(String::from)
        .unwrap_or_else(|| entity.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        let doc = parse("Welcome to our site").unwrap();
        assert_eq!(doc, Document::from_plain_text("Welcome to our site"));
    }

    #[test]
    fn test_parse_empty_string() {
        let doc = parse("").unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert!(doc.blocks[0].is_empty());
    }

    #[test]
    fn test_parse_blocks_with_alignment() {
        let doc = parse(r#"<h1 style="text-align: center">Title</h1><p>Body</p>"#).unwrap();
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].kind, BlockKind::Heading1);
        assert_eq!(doc.blocks[0].align, Align::Center);
        assert_eq!(doc.blocks[1].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks[1].align, Align::Left);
    }

    #[test]
    fn test_parse_nested_marks() {
        let doc = parse("<p><strong>a<em>b</em></strong>c</p>").unwrap();
        let runs = doc.blocks[0].runs();
        assert_eq!(runs.len(), 3);
        assert!(runs[0].1.marks.bold && !runs[0].1.marks.italic);
        assert!(runs[1].1.marks.bold && runs[1].1.marks.italic);
        assert!(runs[2].1.marks.is_plain());
    }

    #[test]
    fn test_parse_color_span() {
        let doc = parse(r##"<p><span style="color:#ff0000">red</span></p>"##).unwrap();
        assert_eq!(doc.blocks[0].runs()[0].1.marks.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_parse_link() {
        let doc = parse(r#"<p>Visit <a href="https://example.com?a=1&amp;b=2">us</a></p>"#).unwrap();
        match &doc.blocks[0].children[1] {
            Inline::Link(link) => {
                assert_eq!(link.url, "https://example.com?a=1&b=2");
                assert_eq!(link.text(), "us");
            }
            other => panic!("Expected link, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_entities_and_breaks() {
        let doc = parse("<p>Fish &amp; Chips<br>&#169; 2024</p>").unwrap();
        assert_eq!(doc.blocks[0].text(), "Fish & Chips\n© 2024");
    }

    #[test]
    fn test_text_outside_blocks_is_implicit_paragraph() {
        let doc = parse("intro<h2>Heading</h2>outro").unwrap();
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[0].text(), "intro");
        assert_eq!(doc.blocks[2].text(), "outro");
    }

    #[test]
    fn test_unknown_tags_are_transparent() {
        let doc = parse("<div><p>Inside <mark>div</mark></p></div>").unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text(), "Inside div");
    }

    #[test]
    fn test_mismatched_tag_error() {
        let err = parse("<p><strong>x</em></p>").unwrap_err();
        assert!(matches!(err, ParseError::MismatchedTag { ref expected, .. } if expected == "strong"));
    }

    #[test]
    fn test_unclosed_tag_error() {
        let err = parse("<p>open").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnclosedTag {
                pos: 0,
                tag: "p".to_string()
            }
        );
    }

    #[test]
    fn test_nested_link_error() {
        let err = parse(r#"<a href="a"><a href="b">x</a></a>"#).unwrap_err();
        assert_eq!(err, ParseError::NestedLink { pos: 12 });
    }

    #[test]
    fn test_link_requires_href() {
        let err = parse("<a>x</a>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_unterminated_attribute() {
        let err = parse(r#"<a href="oops>x</a>"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_or_plain_falls_back() {
        let doc = parse_or_plain("<p>broken");
        assert_eq!(doc, Document::from_plain_text("<p>broken"));
    }
}
