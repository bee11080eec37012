//! Minimal namespace-aware element tree on top of `quick-xml`.
//!
//! Feed parsing needs random access to direct children, attributes and
//! resolved namespaces (`media:thumbnail`, `content:encoded`, Atom elements),
//! so the event stream is folded into a small owned tree first.
//!
//! An element's text is the character data that appears before its first
//! child element; text following a child is discarded. Well-formedness is
//! enforced: mismatched or unclosed tags, unbound prefixes, undeclared
//! entities and content after the root element are all errors.

use quick_xml::encoding::Decoder;
use quick_xml::escape::{EscapeError, resolve_predefined_entity, unescape, unescape_with};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid character or entity reference: {0}")]
    Escape(#[from] EscapeError),
    #[error("unbound namespace prefix `{0}`")]
    UnboundPrefix(String),
    #[error("closing tag `{0}` without an open element")]
    UnexpectedEnd(String),
    #[error("document ended inside `<{0}>`")]
    Unclosed(String),
    #[error("content after the root element")]
    TrailingContent,
    #[error("document has no root element")]
    NoRoot,
}

/// An element with its resolved namespace, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, `None` for elements in no namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `true` if this element has the given namespace and local name.
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// Attribute value by its name as written in the document.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Raw (untrimmed) text, `None` when the element has no text at all.
    pub fn text(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    /// First direct child with the given namespace and local name.
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(namespace, name))
    }

    /// All direct children with the given namespace and local name.
    pub fn children_named<'a>(
        &'a self,
        namespace: Option<&'a str>,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(namespace, name))
    }

    /// Trimmed text of the first matching child, or `default` when the child
    /// is missing or has no text.
    ///
    /// A child holding only whitespace yields an empty string, not `default`.
    pub fn child_text(&self, namespace: Option<&str>, name: &str, default: &str) -> String {
        match self.child(namespace, name).and_then(Element::text) {
            Some(text) => text.trim().to_string(),
            None => default.to_string(),
        }
    }
}

/// Namespace bindings declared on one element: `(prefix, uri)`, with `None`
/// as the default namespace and an empty URI undeclaring it.
type Scope = Vec<(Option<String>, String)>;

/// General entities declared in the internal DTD subset, already expanded.
type Entities = HashMap<String, String>;

/// Parse a complete XML document and return its root element.
///
/// Bytes are decoded with the encoding named by the BOM or the XML
/// declaration, UTF-8 when neither is present. Entities declared in the
/// internal DTD subset are expanded; any other entity besides the five
/// predefined ones is an error.
///
/// # Errors
///
/// Returns an [`XmlError`] if the document is not well-formed or cannot be
/// decoded in its declared encoding.
pub fn parse_document(bytes: &[u8]) -> Result<Element, XmlError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut open: Vec<Element> = Vec::new();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut entities = Entities::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let decoder = reader.decoder();
        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                let (element, scope) = open_element(&e, &scopes, &entities, decoder)?;
                open.push(element);
                scopes.push(scope);
            }
            Event::Empty(e) => {
                if root.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                let (element, _) = open_element(&e, &scopes, &entities, decoder)?;
                attach(element, &mut open, &mut root);
            }
            Event::End(e) => {
                let Some(element) = open.pop() else {
                    let qname = e.name();
                    let name = decode(decoder, qname.as_ref())?;
                    return Err(XmlError::UnexpectedEnd(name.into_owned()));
                };
                scopes.pop();
                attach(element, &mut open, &mut root);
            }
            Event::Text(e) => {
                let raw = decode(decoder, &e)?;
                push_text(&mut open, &expand(&raw, &entities)?)?;
            }
            Event::GeneralRef(e) => {
                let reference = format!("&{};", decode(decoder, &e)?);
                push_text(&mut open, &expand(&reference, &entities)?)?;
            }
            Event::CData(e) => {
                push_text(&mut open, &decode(decoder, &e)?)?;
            }
            Event::DocType(e) => {
                collect_entities(&decode(decoder, &e)?, &mut entities);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(unclosed) = open.last() {
        return Err(XmlError::Unclosed(unclosed.name.clone()));
    }
    root.ok_or(XmlError::NoRoot)
}

fn open_element(
    start: &BytesStart<'_>,
    scopes: &[Scope],
    entities: &Entities,
    decoder: Decoder,
) -> Result<(Element, Scope), XmlError> {
    let mut scope = Scope::new();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr?;
        let key = decode(decoder, attr.key.as_ref())?.into_owned();
        let value = expand(&decode(decoder, &attr.value)?, entities)?.into_owned();
        if key == "xmlns" {
            scope.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((Some(prefix.to_string()), value));
        } else {
            attributes.push((key, value));
        }
    }

    let qname = decode(decoder, start.name().as_ref())?.into_owned();
    let (prefix, name) = match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname.as_str()),
    };
    let namespace = resolve(prefix, &scope, scopes)?;

    let element = Element {
        namespace,
        name: name.to_string(),
        attributes,
        ..Default::default()
    };
    Ok((element, scope))
}

fn decode(decoder: Decoder, bytes: &[u8]) -> Result<Cow<'_, str>, XmlError> {
    decoder
        .decode(bytes)
        .map_err(|e| XmlError::Syntax(e.into()))
}

/// Replace character references, predefined entities and entities declared
/// in the DTD.
fn expand<'a>(raw: &'a str, entities: &Entities) -> Result<Cow<'a, str>, XmlError> {
    let expanded = unescape_with(raw, |name| {
        resolve_predefined_entity(name).or_else(|| entities.get(name).map(String::as_str))
    })?;
    Ok(expanded)
}

/// Record the internal general entities of a `<!DOCTYPE ... [ ... ]>`.
///
/// Parameter and external entities are skipped; the first declaration of a
/// name wins.
fn collect_entities(doctype: &str, entities: &mut Entities) {
    const MARKER: &str = "<!ENTITY";

    let mut rest = doctype;
    while let Some(at) = rest.find(MARKER) {
        rest = rest[at + MARKER.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let Some(name_end) = rest.find(char::is_whitespace) else {
            break;
        };
        let (name, tail) = rest.split_at(name_end);
        let tail = tail.trim_start();
        let Some(quote) = tail.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            rest = tail;
            continue;
        };
        let Some(len) = tail[1..].find(quote) else {
            break;
        };
        if let Ok(value) = unescape(&tail[1..1 + len]) {
            entities
                .entry(name.to_string())
                .or_insert_with(|| value.into_owned());
        }
        rest = &tail[1 + len..];
    }
}

fn resolve(prefix: Option<&str>, own: &Scope, outer: &[Scope]) -> Result<Option<String>, XmlError> {
    if prefix == Some("xml") {
        return Ok(Some(XML_NS.to_string()));
    }
    let binding = std::iter::once(own)
        .chain(outer.iter().rev())
        .flat_map(|scope| scope.iter())
        .find(|(p, _)| p.as_deref() == prefix);

    match (binding, prefix) {
        (Some((_, uri)), _) if uri.is_empty() => Ok(None),
        (Some((_, uri)), _) => Ok(Some(uri.clone())),
        (None, None) => Ok(None),
        (None, Some(p)) => Err(XmlError::UnboundPrefix(p.to_string())),
    }
}

fn attach(element: Element, open: &mut [Element], root: &mut Option<Element>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(open: &mut [Element], text: &str) -> Result<(), XmlError> {
    match open.last_mut() {
        Some(current) if current.children.is_empty() => current.text.push_str(text),
        Some(_) => {}
        None if is_blank(text) => {}
        None => return Err(XmlError::TrailingContent),
    }
    Ok(())
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}
