use crate::dispatch::{self, Metadata};
use crate::error::Result;
use crate::kind::Kind;
use crate::node::Node;
use crate::source::{self, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Ignore,
    Accept,
    TestChildren,
}

/// Name and kind of one container ancestor, root first.
#[derive(Debug, Clone, Copy)]
pub struct Ancestor<'a> {
    pub name: &'a str,
    pub kind: Kind,
}

pub trait NodeFilter {
    fn decide(&self, parents: &[Ancestor<'_>], name: &str, kind: Kind) -> Decision;
}

pub struct NoFilter;

impl NodeFilter for NoFilter {
    fn decide(&self, _parents: &[Ancestor<'_>], _name: &str, _kind: Kind) -> Decision {
        Decision::Accept
    }
}

pub struct AbsolutePath {
    path: Vec<String>,
}

impl AbsolutePath {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AbsolutePath {
            path: parts.into_iter().map(Into::into).collect(),
        }
    }
}

impl NodeFilter for AbsolutePath {
    fn decide(&self, parents: &[Ancestor<'_>], name: &str, _kind: Kind) -> Decision {
        let depth = parents.len();
        if depth + 1 > self.path.len() {
            return Decision::Ignore;
        }
        for (ancestor, expected) in parents.iter().zip(self.path.iter()) {
            if ancestor.name != expected {
                return Decision::Ignore;
            }
        }
        if name != self.path[depth] {
            return Decision::Ignore;
        }
        if depth + 1 == self.path.len() {
            Decision::Accept
        } else {
            Decision::TestChildren
        }
    }
}

pub struct NameAnywhere {
    name: String,
}

impl NameAnywhere {
    pub fn new(name: impl Into<String>) -> Self {
        NameAnywhere { name: name.into() }
    }
}

impl NodeFilter for NameAnywhere {
    fn decide(&self, _parents: &[Ancestor<'_>], name: &str, _kind: Kind) -> Decision {
        if name == self.name {
            Decision::Accept
        } else {
            Decision::TestChildren
        }
    }
}

// a node whose header is read but whose payload isn't, awaiting a filter decision
struct Pending {
    name: String,
    kind: Kind,
    metadata: Metadata,
}

struct OpenContainer {
    name: String,
    kind: Kind,
    // Some((content_kind, remaining)) for a List; None for a Compound
    list_cursor: Option<(Kind, i32)>,
}

pub struct FilteredNodes<'s, S: Source + ?Sized, F: NodeFilter> {
    source: &'s mut S,
    filter: F,
    stack: Vec<OpenContainer>,
    pending: Option<Pending>,
    finished: bool,
}

impl<'s, S: Source + ?Sized, F: NodeFilter> FilteredNodes<'s, S, F> {
    pub(crate) fn new(
        source: &'s mut S,
        filter: F,
        root_name: String,
        root_kind: Kind,
    ) -> Result<Self> {
        let metadata = dispatch::read_metadata(source, root_kind)?;
        Ok(FilteredNodes {
            source,
            filter,
            stack: Vec::new(),
            pending: Some(Pending {
                name: root_name,
                kind: root_kind,
                metadata,
            }),
            finished: false,
        })
    }

    fn ancestors(&self) -> Vec<Ancestor<'_>> {
        self.stack
            .iter()
            .map(|c| Ancestor {
                name: &c.name,
                kind: c.kind,
            })
            .collect()
    }

    fn next_child_of_top(&mut self) -> Result<Option<Pending>> {
        let top = match self.stack.last_mut() {
            Some(c) => c,
            None => return Ok(None),
        };
        match &mut top.list_cursor {
            Some((content_kind, remaining)) => {
                if *remaining <= 0 {
                    return Ok(None);
                }
                *remaining -= 1;
                let kind = *content_kind;
                let metadata = dispatch::read_metadata(self.source, kind)?;
                Ok(Some(Pending {
                    name: String::new(),
                    kind,
                    metadata,
                }))
            }
            None => {
                let kind_byte = source::read_u8(self.source)?;
                let kind = Kind::try_from_u8(kind_byte)?;
                if kind == Kind::End {
                    return Ok(None);
                }
                let name = source::read_mutf8_string(self.source)?;
                let metadata = dispatch::read_metadata(self.source, kind)?;
                Ok(Some(Pending { name, kind, metadata }))
            }
        }
    }

    fn step(&mut self) -> Result<Option<Node>> {
        if self.finished {
            return Ok(None);
        }
        loop {
            if let Some(p) = self.pending.take() {
                let ancestors = self.ancestors();
                let decision = self.filter.decide(&ancestors, &p.name, p.kind);
                match decision {
                    Decision::Accept => {
                        let node = dispatch::read_payload(self.source, p.kind, p.metadata)?;
                        return Ok(Some(node));
                    }
                    Decision::Ignore => {
                        log::debug!("filtered reader skipping subtree of kind {}", p.kind);
                        dispatch::skip_payload(self.source, p.kind, p.metadata)?;
                    }
                    Decision::TestChildren if p.kind.is_container() => {
                        let list_cursor = match p.metadata {
                            Metadata::List {
                                content_kind,
                                length,
                            } => Some((content_kind, length)),
                            Metadata::None => None,
                        };
                        self.stack.push(OpenContainer {
                            name: p.name,
                            kind: p.kind,
                            list_cursor,
                        });
                        match self.next_child_of_top()? {
                            Some(child) => {
                                self.pending = Some(child);
                                continue;
                            }
                            None => {
                                self.stack.pop();
                            }
                        }
                    }
                    Decision::TestChildren => {
                        log::debug!("filtered reader skipping leaf of kind {}", p.kind);
                        dispatch::skip_payload(self.source, p.kind, p.metadata)?;
                    }
                }
            } else {
                match self.next_child_of_top()? {
                    Some(child) => {
                        self.pending = Some(child);
                    }
                    None => match self.stack.pop() {
                        Some(_) => continue,
                        None => {
                            self.finished = true;
                            return Ok(None);
                        }
                    },
                }
            }
        }
    }
}

impl<'s, S: Source + ?Sized, F: NodeFilter> Iterator for FilteredNodes<'s, S, F> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BufferedSource;
    use std::io::Cursor;

    fn hello_world_bytes() -> Vec<u8> {
        vec![
            0x0A, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o', 0x08, 0x00, 0x04, b'n', b'a', b'm',
            b'e', 0x00, 0x06, b'B', b'a', b'n', b'a', b'n', b'a', 0x00,
        ]
    }

    #[test]
    fn no_filter_yields_just_the_root() {
        let bytes = hello_world_bytes();
        let mut cursor = Cursor::new(&bytes[1..]); // kind byte consumed by caller normally
        let mut source = BufferedSource::new(&mut cursor);
        let name = source::read_mutf8_string(&mut source).unwrap();
        assert_eq!(name, "hello");
        let nodes: Vec<_> = FilteredNodes::new(&mut source, NoFilter, name, Kind::Compound)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::Compound(c) => assert_eq!(c.len(), 1),
            other => panic!("expected Compound, got {:?}", other),
        }
    }

    #[test]
    fn name_anywhere_finds_nested_node() {
        let bytes = hello_world_bytes();
        let mut cursor = Cursor::new(&bytes[1..]);
        let mut source = BufferedSource::new(&mut cursor);
        let name = source::read_mutf8_string(&mut source).unwrap();
        let nodes: Vec<_> =
            FilteredNodes::new(&mut source, NameAnywhere::new("name"), name, Kind::Compound)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0], Node::String("Banana".into()));
    }

    #[test]
    fn absolute_path_rejects_everything_outside_the_path() {
        let bytes = hello_world_bytes();
        let mut cursor = Cursor::new(&bytes[1..]);
        let mut source = BufferedSource::new(&mut cursor);
        let name = source::read_mutf8_string(&mut source).unwrap();
        let filter = AbsolutePath::new(["hello", "missing"]);
        let nodes: Vec<_> = FilteredNodes::new(&mut source, filter, name, Kind::Compound)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert!(nodes.is_empty());
    }
}
