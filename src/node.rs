use indexmap::IndexMap;

use crate::error::Error;
use crate::kind::Kind;

// Kind::End never appears here, it is purely the wire sentinel for Compound termination.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Int8Array(Vec<i8>),
    String(String),
    List(List),
    Compound(Compound),
    Int32Array(Vec<i32>),
    Int64Array(Vec<i64>),
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Int8(_) => Kind::Int8,
            Node::Int16(_) => Kind::Int16,
            Node::Int32(_) => Kind::Int32,
            Node::Int64(_) => Kind::Int64,
            Node::Float32(_) => Kind::Float32,
            Node::Float64(_) => Kind::Float64,
            Node::Int8Array(_) => Kind::Int8Array,
            Node::String(_) => Kind::String,
            Node::List(_) => Kind::List,
            Node::Compound(_) => Kind::Compound,
            Node::Int32Array(_) => Kind::Int32Array,
            Node::Int64Array(_) => Kind::Int64Array,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Node::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    content_kind: Kind,
    items: Vec<Node>,
}

impl List {
    pub fn empty() -> Self {
        List {
            content_kind: Kind::End,
            items: Vec::new(),
        }
    }

    pub fn new(content_kind: Kind, items: Vec<Node>) -> Result<Self, Error> {
        if content_kind == Kind::End && !items.is_empty() {
            return Err(Error::ListContentMismatch {
                declared: Kind::End,
                found: items[0].kind(),
            });
        }
        for item in &items {
            if item.kind() != content_kind {
                return Err(Error::ListContentMismatch {
                    declared: content_kind,
                    found: item.kind(),
                });
            }
        }
        Ok(List { content_kind, items })
    }

    pub fn content_kind(&self) -> Kind {
        self.content_kind
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Node> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound(IndexMap<String, Node>);

impl Compound {
    pub fn new() -> Self {
        Compound(IndexMap::new())
    }

    pub fn try_insert(&mut self, name: String, value: Node) -> Result<(), Error> {
        if self.0.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        self.0.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Node)> for Compound {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        Compound(IndexMap::from_iter(iter))
    }
}
