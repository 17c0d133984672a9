//! XML bridge, exercised through the public `Reader`/`Writer` surface:
//! `Reader::read_xml` materializes a binary NBT tree as an XML element
//! tree, `Writer::write_xml` serializes that element tree back out as
//! XML text.

use std::io::Cursor;

use nbt::{Compound, Compression, Kind, List, Node, Reader, Writer};

fn sample_tree() -> Node {
    let mut inner = Compound::new();
    inner.try_insert("x".into(), Node::Int32(42)).unwrap();
    inner
        .try_insert("label".into(), Node::String("hello\0world".into()))
        .unwrap();

    let nums = Node::List(List::new(Kind::Int32, vec![Node::Int32(1), Node::Int32(2)]).unwrap());

    let mut root = Compound::new();
    root.try_insert("nested".into(), Node::Compound(inner))
        .unwrap();
    root.try_insert("nums".into(), nums).unwrap();
    Node::Compound(root)
}

#[test]
fn read_xml_maps_tag_names_to_kinds_and_carries_name_attributes() {
    let mut bytes = Vec::new();
    Writer::open(&mut bytes, false)
        .write_tree(&sample_tree(), "root")
        .unwrap();

    let mut reader = Reader::open(Cursor::new(bytes), Compression::None).unwrap();
    let (element, root_kind) = reader.read_xml(true).unwrap();

    assert_eq!(root_kind, Kind::Compound);
    assert_eq!(element.name, "TCompound");
    assert_eq!(element.attributes, vec![("Name".to_string(), "root".to_string())]);
    assert_eq!(element.children.len(), 2);

    let nested = element
        .children
        .iter()
        .find(|c| c.attributes.iter().any(|(k, v)| k == "Name" && v == "nested"))
        .expect("nested child present");
    assert_eq!(nested.name, "TCompound");

    let nums = element
        .children
        .iter()
        .find(|c| c.attributes.iter().any(|(k, v)| k == "Name" && v == "nums"))
        .expect("nums child present");
    assert_eq!(nums.name, "TList");
    assert!(nums
        .attributes
        .iter()
        .any(|(k, v)| k == "ContentType" && v == "TInt32"));
}

#[test]
fn write_xml_produces_well_formed_nested_markup() {
    let mut bytes = Vec::new();
    Writer::open(&mut bytes, false)
        .write_tree(&sample_tree(), "root")
        .unwrap();

    let mut reader = Reader::open(Cursor::new(bytes), Compression::None).unwrap();
    let (element, _) = reader.read_xml(true).unwrap();

    let mut xml_bytes = Vec::new();
    Writer::open(&mut xml_bytes, false).write_xml(&element).unwrap();
    let xml_text = String::from_utf8(xml_bytes).unwrap();

    assert!(xml_text.starts_with("<TCompound"));
    assert!(xml_text.contains("Name=\"root\""));
    assert!(xml_text.contains("ContentType=\"TInt32\""));
    assert!(xml_text.trim_end().ends_with("</TCompound>"));
}

#[test]
fn nul_byte_string_survives_the_xml_bridge() {
    let mut bytes = Vec::new();
    Writer::open(&mut bytes, false)
        .write_tree(&sample_tree(), "root")
        .unwrap();
    let mut reader = Reader::open(Cursor::new(bytes), Compression::None).unwrap();
    let (element, _) = reader.read_xml(true).unwrap();

    let nested = element
        .children
        .iter()
        .find(|c| c.attributes.iter().any(|(k, v)| k == "Name" && v == "nested"))
        .unwrap();
    let label = nested
        .children
        .iter()
        .find(|c| c.attributes.iter().any(|(k, v)| k == "Name" && v == "label"))
        .unwrap();
    assert_eq!(label.text.as_deref(), Some("hello\0world"));
}
