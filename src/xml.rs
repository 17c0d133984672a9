use std::io::{BufRead, Write};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader as XmlEventReader, Writer as XmlEventWriter};

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::node::{Compound, List, Node};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }
}

pub fn node_to_element(node: &Node, name: Option<&str>) -> Element {
    let mut el = Element::new(node.kind().xml_name());
    if let Some(name) = name {
        el = el.with_attr("Name", name);
    }
    match node {
        Node::Int8(v) => el.text = Some(v.to_string()),
        Node::Int16(v) => el.text = Some(v.to_string()),
        Node::Int32(v) => el.text = Some(v.to_string()),
        Node::Int64(v) => el.text = Some(v.to_string()),
        Node::Float32(v) => el.text = Some(format_float32(*v)),
        Node::Float64(v) => el.text = Some(format_float64(*v)),
        Node::Int8Array(items) => {
            for v in items {
                el.children.push(leaf_element(Kind::Int8, &v.to_string()));
            }
        }
        Node::String(s) => el.text = Some(s.clone()),
        Node::List(list) => {
            el = el.with_attr("ContentType", list.content_kind().xml_name());
            for item in list.items() {
                el.children.push(node_to_element(item, None));
            }
        }
        Node::Compound(compound) => {
            for (name, child) in compound.iter() {
                el.children.push(node_to_element(child, Some(name)));
            }
        }
        Node::Int32Array(items) => {
            for v in items {
                el.children.push(leaf_element(Kind::Int32, &v.to_string()));
            }
        }
        Node::Int64Array(items) => {
            for v in items {
                el.children.push(leaf_element(Kind::Int64, &v.to_string()));
            }
        }
    }
    el
}

fn leaf_element(kind: Kind, text: &str) -> Element {
    let mut el = Element::new(kind.xml_name());
    el.text = Some(text.to_string());
    el
}

fn format_float32(v: f32) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        v.to_string()
    }
}

fn format_float64(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        v.to_string()
    }
}

pub fn element_to_node(el: &Element) -> Result<(Node, Option<String>)> {
    let kind = Kind::from_xml_name(&el.name)
        .ok_or_else(|| Error::FormatError(format!("unrecognized element name {:?}", el.name)))?;
    let name = el.attr("Name").map(|s| s.to_string());
    let text = || -> Result<&str> {
        el.text
            .as_deref()
            .ok_or_else(|| Error::FormatError(format!("element {:?} has no text content", el.name)))
    };
    let node = match kind {
        Kind::End => {
            return Err(Error::FormatError(
                "TEnd cannot be materialized as a value".into(),
            ))
        }
        Kind::Int8 => Node::Int8(parse(text()?, "Int8")?),
        Kind::Int16 => Node::Int16(parse(text()?, "Int16")?),
        Kind::Int32 => Node::Int32(parse(text()?, "Int32")?),
        Kind::Int64 => Node::Int64(parse(text()?, "Int64")?),
        Kind::Float32 => Node::Float32(parse_float(text()?)?),
        Kind::Float64 => Node::Float64(parse_float(text()?)?),
        Kind::Int8Array => {
            let mut items = Vec::with_capacity(el.children.len());
            for child in &el.children {
                items.push(parse(
                    child
                        .text
                        .as_deref()
                        .ok_or_else(|| Error::FormatError("array element has no text".into()))?,
                    "Int8",
                )?);
            }
            Node::Int8Array(items)
        }
        Kind::String => Node::String(el.text.clone().unwrap_or_default()),
        Kind::List => {
            let content_name = el.attr("ContentType").ok_or_else(|| {
                Error::FormatError(format!("list element {:?} is missing ContentType", el.name))
            })?;
            let content_kind = Kind::from_xml_name(content_name).ok_or_else(|| {
                Error::FormatError(format!("unrecognized ContentType {:?}", content_name))
            })?;
            let mut items = Vec::with_capacity(el.children.len());
            for child in &el.children {
                let (item, _) = element_to_node(child)?;
                items.push(item);
            }
            Node::List(List::new(content_kind, items)?)
        }
        Kind::Compound => {
            let mut compound = Compound::new();
            for child in &el.children {
                let (value, child_name) = element_to_node(child)?;
                let child_name = child_name.ok_or_else(|| {
                    Error::FormatError(format!("compound child {:?} is missing Name", child.name))
                })?;
                compound.try_insert(child_name, value)?;
            }
            Node::Compound(compound)
        }
        Kind::Int32Array => {
            let mut items = Vec::with_capacity(el.children.len());
            for child in &el.children {
                items.push(parse(
                    child
                        .text
                        .as_deref()
                        .ok_or_else(|| Error::FormatError("array element has no text".into()))?,
                    "Int32",
                )?);
            }
            Node::Int32Array(items)
        }
        Kind::Int64Array => {
            let mut items = Vec::with_capacity(el.children.len());
            for child in &el.children {
                items.push(parse(
                    child
                        .text
                        .as_deref()
                        .ok_or_else(|| Error::FormatError("array element has no text".into()))?,
                    "Int64",
                )?);
            }
            Node::Int64Array(items)
        }
    };
    Ok((node, name))
}

fn parse<T: std::str::FromStr>(text: &str, label: &'static str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::FormatError(format!("could not parse {:?} as {}", text, label)))
}

fn parse_float<T: std::str::FromStr>(text: &str) -> Result<T> {
    if text == "NaN" {
        "NaN".parse().map_err(|_| {
            Error::FormatError("platform float parser rejected NaN literal".into())
        })
    } else {
        parse(text, "float")
    }
}

// no indentation: whitespace text nodes would be indistinguishable from a leaf TString's value
pub fn write_element<W: Write>(sink: &mut W, root: &Element) -> Result<()> {
    let mut writer = XmlEventWriter::new(sink);
    write_element_inner(&mut writer, root)?;
    Ok(())
}

fn write_element_inner<W: Write>(writer: &mut XmlEventWriter<W>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.clone());
    for (key, value) in &el.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if el.children.is_empty() {
        match &el.text {
            Some(text) => {
                writer
                    .write_event(Event::Start(start.clone()))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(xml_err)?;
                writer
                    .write_event(Event::End(BytesEnd::new(el.name.clone())))
                    .map_err(xml_err)?;
            }
            None => {
                writer.write_event(Event::Empty(start)).map_err(xml_err)?;
            }
        }
    } else {
        writer
            .write_event(Event::Start(start))
            .map_err(xml_err)?;
        for child in &el.children {
            write_element_inner(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(el.name.clone())))
            .map_err(xml_err)?;
    }
    Ok(())
}

fn xml_err(e: quick_xml::Error) -> Error {
    Error::FormatError(format!("xml write failure: {}", e))
}

pub fn read_element<R: BufRead>(source: R) -> Result<Element> {
    let mut reader = XmlEventReader::from_reader(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();
    loop {
        let decoder = reader.decoder();
        match reader.read_event_into(&mut buf).map_err(|e| {
            Error::FormatError(format!("xml parse failure: {}", e))
        })? {
            Event::Start(start) => stack.push(element_from_start(&start, decoder)?),
            Event::Empty(start) => {
                let el = element_from_start(&start, decoder)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(el),
                    None => return Ok(el),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let decoded = text
                        .unescape()
                        .map_err(|e| Error::FormatError(format!("xml text decode failure: {}", e)))?;
                    top.text = Some(decoded.into_owned());
                }
            }
            Event::End(_) => {
                let finished = stack.pop().ok_or_else(|| {
                    Error::FormatError("unbalanced xml end tag".into())
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => return Ok(finished),
                }
            }
            Event::Eof => {
                return Err(Error::FormatError("xml ended before root closed".into()))
            }
            _ => {}
        }
        buf.clear();
    }
}

fn element_from_start(
    start: &BytesStart,
    decoder: quick_xml::encoding::Decoder,
) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut el = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::FormatError(format!("bad xml attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| Error::FormatError(format!("bad xml attribute value: {}", e)))?
            .into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_round_trips_through_xml_text() {
        let node = Node::Int32(42);
        let el = node_to_element(&node, Some("x"));
        assert_eq!(el.name, "TInt32");
        assert_eq!(el.attr("Name"), Some("x"));
        let (back, name) = element_to_node(&el).unwrap();
        assert_eq!(back, node);
        assert_eq!(name.as_deref(), Some("x"));
    }

    #[test]
    fn compound_round_trips() {
        let mut compound = Compound::new();
        compound.try_insert("x".into(), Node::Int32(42)).unwrap();
        compound.try_insert("y".into(), Node::Int32(7)).unwrap();
        let node = Node::Compound(compound);
        let el = node_to_element(&node, Some("root"));
        let mut bytes = Vec::new();
        write_element(&mut bytes, &el).unwrap();
        let parsed = read_element(bytes.as_slice()).unwrap();
        let (back, name) = element_to_node(&parsed).unwrap();
        assert_eq!(back, node);
        assert_eq!(name.as_deref(), Some("root"));
    }

    #[test]
    fn list_round_trips_with_content_type() {
        let list = List::new(Kind::Int32, vec![Node::Int32(1), Node::Int32(2)]).unwrap();
        let node = Node::List(list);
        let el = node_to_element(&node, Some("nums"));
        assert_eq!(el.attr("ContentType"), Some("TInt32"));
        let mut bytes = Vec::new();
        write_element(&mut bytes, &el).unwrap();
        let parsed = read_element(bytes.as_slice()).unwrap();
        let (back, _) = element_to_node(&parsed).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn missing_content_type_is_a_format_error() {
        let mut el = Element::new("TList");
        el.children.push(leaf_element(Kind::Int32, "1"));
        match element_to_node(&el) {
            Err(Error::FormatError(_)) => {}
            other => panic!("expected FormatError, got {:?}", other),
        }
    }
}
