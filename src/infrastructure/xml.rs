//! Tree provider backed by quick-xml
//!
//! Streams the input once and builds an arena [`Document`] rooted at the first
//! element with the requested tag. Whitespace is kept verbatim: leading text
//! lands in `text`, text after a child lands in that child's `tail`.

use std::borrow::Cow;

use generational_arena::Index;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, instrument};

use crate::domain::{Document, ElementData};
use crate::infrastructure::traits::{ParseError, TreeProvider};

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlTreeProvider;

impl XmlTreeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TreeProvider for XmlTreeProvider {
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    fn parse(&self, bytes: &[u8], root_tag: &str) -> Result<Document, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        let mut buf = Vec::new();

        let mut doc = Document::new();
        let mut builder = TreeBuilder::default();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| ParseError {
                position: reader.error_position() as u64,
                message: e.to_string(),
            })?;
            let position = reader.buffer_position() as u64;

            match event {
                Event::Start(e) => {
                    let data = element_data(&e, position)?;
                    if builder.accepts(&data, root_tag) {
                        builder.open(&mut doc, data);
                    }
                }
                Event::Empty(e) => {
                    let data = element_data(&e, position)?;
                    if builder.accepts(&data, root_tag) {
                        builder.leaf(&mut doc, data);
                        if builder.finished() {
                            break;
                        }
                    }
                }
                Event::End(_) => {
                    builder.close();
                    if builder.finished() {
                        break;
                    }
                }
                Event::Text(t) => {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&t).into_owned()));
                    builder.text(&mut doc, &text);
                }
                Event::CData(c) => builder.text(&mut doc, &String::from_utf8_lossy(&c)),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let position = reader.buffer_position() as u64;
        if !builder.started {
            return Err(ParseError {
                position,
                message: format!("no <{root_tag}> element found"),
            });
        }
        if !builder.finished() {
            return Err(ParseError {
                position,
                message: format!("unexpected end of input inside <{root_tag}>"),
            });
        }

        debug!(nodes = doc.len(), "parsed document");
        Ok(doc)
    }
}

/// Incremental tree assembly state.
#[derive(Default)]
struct TreeBuilder {
    /// Open elements, innermost last
    stack: Vec<Index>,
    /// Most recently closed child of the innermost open element
    last_closed: Option<Index>,
    started: bool,
    done: bool,
}

impl TreeBuilder {
    /// Outside the root only an element named `root_tag` starts the tree.
    fn accepts(&self, data: &ElementData, root_tag: &str) -> bool {
        !self.done && (!self.stack.is_empty() || data.tag == root_tag)
    }

    fn open(&mut self, doc: &mut Document, data: ElementData) {
        let idx = doc.insert_node(data, self.stack.last().copied());
        self.started = true;
        self.stack.push(idx);
        self.last_closed = None;
    }

    fn leaf(&mut self, doc: &mut Document, data: ElementData) {
        let idx = doc.insert_node(data, self.stack.last().copied());
        self.started = true;
        if self.stack.is_empty() {
            self.done = true;
        }
        self.last_closed = Some(idx);
    }

    fn close(&mut self) {
        if let Some(idx) = self.stack.pop() {
            self.last_closed = Some(idx);
            if self.stack.is_empty() {
                self.done = true;
            }
        }
    }

    fn text(&mut self, doc: &mut Document, fragment: &str) {
        let Some(&current) = self.stack.last() else {
            return;
        };
        match self.last_closed.and_then(|idx| doc.get_node_mut(idx)) {
            Some(sibling) => sibling.data.append_tail(fragment),
            None => {
                if let Some(node) = doc.get_node_mut(current) {
                    node.data.append_text(fragment);
                }
            }
        }
    }

    fn finished(&self) -> bool {
        self.done
    }
}

fn element_data(start: &BytesStart<'_>, position: u64) -> Result<ElementData, ParseError> {
    let mut data = ElementData::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        data.attrs.insert(key, value);
    }
    Ok(data)
}
