//! Streaming access to the ClinVar full-release XML.
//!
//! The dump is a multi-gigabyte document of repeating `<ClinVarSet>`
//! entries. [`SubtreeReader`] walks the event stream and materializes one
//! entry subtree at a time as a small [`Element`] tree, so memory stays
//! bounded by the largest single entry while the projection code can query
//! the entry like a document.

use std::io::BufRead;

use fxhash::FxHashMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One materialized XML element: name, attributes, accumulated text, and
/// child elements in document order.
#[derive(Debug, Default, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: FxHashMap<String, String>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Element text with surrounding whitespace removed.
    pub fn text_trimmed(&self) -> &str {
        self.text.trim()
    }

    /// First direct child with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// This element and every nested element, depth-first.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Every nested element (including self) with the given name.
    pub fn find_descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.name == name)
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let element = self.stack.pop()?;
        for child in element.children.iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Element {
    let mut element = Element {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..Element::default()
    };
    // Attribute decoding is best-effort: a bad entity in one attribute must
    // not lose the whole entry.
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        element.attrs.insert(key, value);
    }
    element
}

/// Streams subtrees rooted at elements with a fixed target name (for
/// ClinVar, `ClinVarSet`) out of an XML document. Content outside target
/// elements is skipped.
pub struct SubtreeReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    target: String,
}

impl<R: BufRead> SubtreeReader<R> {
    pub fn new(source: R, target: &str) -> Self {
        SubtreeReader {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            target: target.to_string(),
        }
    }

    /// The next target subtree, or `None` at end of document.
    pub fn next_subtree(&mut self) -> Result<Option<Element>, XmlError> {
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(start) if start.local_name().as_ref() == self.target.as_bytes() => {
                    let root = element_from_start(&start);
                    return self.read_to_end_of(root).map(Some);
                }
                Event::Empty(start) if start.local_name().as_ref() == self.target.as_bytes() => {
                    return Ok(Some(element_from_start(&start)));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Consume events until the already-opened `root` element closes,
    /// materializing its subtree.
    fn read_to_end_of(&mut self, root: Element) -> Result<Element, XmlError> {
        let mut stack: Vec<Element> = vec![root];
        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(start) => stack.push(element_from_start(&start)),
                Event::Empty(start) => {
                    let element = element_from_start(&start);
                    // stack is never empty inside the subtree
                    stack.last_mut().unwrap().children.push(element);
                }
                Event::Text(text) => {
                    let current = stack.last_mut().unwrap();
                    match text.unescape() {
                        Ok(s) => current.text.push_str(&s),
                        Err(_) => current.text.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
                Event::CData(data) => {
                    let current = stack.last_mut().unwrap();
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
                Event::End(_) => {
                    let finished = stack.pop().unwrap();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => return Ok(finished),
                    }
                }
                Event::Eof => {
                    return Err(XmlError::Malformed(format!(
                        "unexpected end of document inside <{}>",
                        self.target
                    )));
                }
                _ => {}
            }
        }
    }
}
