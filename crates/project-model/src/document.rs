//! Owned XML document tree with a quick-xml codec.
//!
//! Kdenlive project files are MLT XML. The animator needs to read a handful
//! of attributes and append `filter` subtrees, while everything it does not
//! touch must survive the trip back to disk. The tree therefore keeps element
//! order, attribute order, text (including whitespace), comments, CDATA and
//! processing instructions exactly as read.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: vec![],
            children: vec![],
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style text content setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Attribute value by key.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First child element with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Whether a child element with the given tag name exists.
    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Mutable access to the child node at `index` if it is an element.
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Shared access to the child node at `index` if it is an element.
    pub fn element_at(&self, index: usize) -> Option<&Element> {
        match self.children.get(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Append a child element.
    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Concatenated text and CDATA content of this element (not descendants).
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) | Node::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of the first `<property name="...">` child, the MLT key/value idiom.
    pub fn property(&self, name: &str) -> Option<String> {
        self.children_named("property")
            .find(|p| p.attr("name") == Some(name))
            .map(Element::text)
    }
}

/// A parsed XML document: the root element plus nodes around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Doctype, comments and processing instructions before the root.
    pub prolog: Vec<PrologNode>,
    pub root: Element,
    /// Comments and processing instructions after the root.
    pub epilog: Vec<PrologNode>,
}

/// Non-element nodes allowed outside the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrologNode {
    DocType(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// Errors raised while reading or writing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: usize,
        source: quick_xml::Error,
    },

    #[error("Malformed document: {message}")]
    Malformed { message: String },
}

impl DocumentError {
    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed {
            message: msg.into(),
        }
    }
}

impl From<DocumentError> for ksg_common::KsgError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound { path } => ksg_common::KsgError::FileNotFound { path },
            DocumentError::Io { path, source } => ksg_common::KsgError::IoAt { path, source },
            other => ksg_common::KsgError::parse(other.to_string()),
        }
    }
}

impl Document {
    /// Load and parse a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DocumentError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DocumentError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(&content)
    }

    /// Parse a document from a string.
    pub fn parse(content: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(false);

        let mut prolog = vec![];
        let mut epilog = vec![];
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = vec![];

        loop {
            let event = reader.read_event().map_err(|source| DocumentError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
            let xml_err = |source: quick_xml::Error| DocumentError::Xml {
                position: reader.buffer_position(),
                source,
            };

            match event {
                Event::Start(start) => stack.push(element_from_start(&start).map_err(xml_err)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start).map_err(xml_err)?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| DocumentError::malformed("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, Node::Element(element))?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_err)?.into_owned();
                    if stack.is_empty() {
                        if !text.trim().is_empty() {
                            return Err(DocumentError::malformed(
                                "character data outside the root element",
                            ));
                        }
                    } else {
                        attach(&mut stack, &mut root, Node::Text(text))?;
                    }
                }
                Event::CData(data) => {
                    let data = utf8(&data)?;
                    attach(&mut stack, &mut root, Node::CData(data))?;
                }
                Event::Comment(comment) => {
                    let comment = utf8(&comment)?;
                    if stack.is_empty() {
                        outside(&root, &mut prolog, &mut epilog).push(PrologNode::Comment(comment));
                    } else {
                        attach(&mut stack, &mut root, Node::Comment(comment))?;
                    }
                }
                Event::PI(pi) => {
                    let pi = utf8(&pi)?;
                    if stack.is_empty() {
                        outside(&root, &mut prolog, &mut epilog)
                            .push(PrologNode::ProcessingInstruction(pi));
                    } else {
                        attach(&mut stack, &mut root, Node::ProcessingInstruction(pi))?;
                    }
                }
                Event::DocType(doctype) => prolog.push(PrologNode::DocType(utf8(&doctype)?)),
                // The declaration is regenerated on save.
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(DocumentError::malformed(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        let root = root.ok_or_else(|| DocumentError::malformed("document has no root element"))?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize the document, including an XML declaration, as UTF-8 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        let xml_err = |source| DocumentError::Xml {
            position: 0,
            source,
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_err)?;
        writer.get_mut().push(b'\n');

        for node in &self.prolog {
            write_outside(&mut writer, node).map_err(xml_err)?;
            writer.get_mut().push(b'\n');
        }
        write_element(&mut writer, &self.root).map_err(xml_err)?;
        for node in &self.epilog {
            writer.get_mut().push(b'\n');
            write_outside(&mut writer, node).map_err(xml_err)?;
        }

        Ok(writer.into_inner())
    }

    /// Serialize the document to a string.
    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        let bytes = self.to_bytes()?;
        String::from_utf8(bytes).map_err(|e| DocumentError::malformed(e.to_string()))
    }

    /// Write the document to disk, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, quick_xml::Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Attach a finished node to the open element, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    node: Node,
) -> Result<(), DocumentError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        Node::Element(element) => Err(DocumentError::malformed(format!(
            "second root element <{}>",
            element.name
        ))),
        _ => Err(DocumentError::malformed("content outside the root element")),
    }
}

fn outside<'a>(
    root: &Option<Element>,
    prolog: &'a mut Vec<PrologNode>,
    epilog: &'a mut Vec<PrologNode>,
) -> &'a mut Vec<PrologNode> {
    if root.is_some() {
        epilog
    } else {
        prolog
    }
}

fn utf8(bytes: &[u8]) -> Result<String, DocumentError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| DocumentError::malformed(e.to_string()))
}

fn write_outside(
    writer: &mut Writer<Vec<u8>>,
    node: &PrologNode,
) -> Result<(), quick_xml::Error> {
    match node {
        PrologNode::DocType(d) => writer.write_event(Event::DocType(BytesText::from_escaped(d))),
        PrologNode::Comment(c) => writer.write_event(Event::Comment(BytesText::from_escaped(c))),
        PrologNode::ProcessingInstruction(pi) => {
            writer.write_event(Event::PI(BytesText::from_escaped(pi)))
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(c) => writer.write_event(Event::CData(BytesCData::new(c.as_str())))?,
            Node::Comment(c) => writer.write_event(Event::Comment(BytesText::from_escaped(c)))?,
            Node::ProcessingInstruction(pi) => {
                writer.write_event(Event::PI(BytesText::from_escaped(pi)))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}
