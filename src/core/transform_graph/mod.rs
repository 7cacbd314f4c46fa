//! Directed graph of template spaces whose edges are transform identifiers.
//!
//! The graph answers one question for the serving path: which ordered chain of
//! transform files leads from a source space to a target space. Lookups are a
//! breadth-first search over links in insertion order, so when several chains
//! of the same length exist the one whose links were declared first wins.

pub mod dot;
pub mod lint;

use crate::core::types::TransformChain;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while building or querying a [`TransformGraph`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown space {0:?}")]
    UnknownSpace(String),
    #[error("there is already a space named {0:?}")]
    DuplicateSpace(String),
    #[error("{from:?} already has a link to {to:?}")]
    DuplicateLink { from: String, to: String },
    #[error("there is no link from {from:?} to {to:?}")]
    MissingLink { from: String, to: String },
    #[error("malformed transform graph description: {0}")]
    Malformed(String),
    #[error("spaces {first:?} and {second:?} map to the same graphviz identifier {identifier}")]
    NameCollision {
        first: String,
        second: String,
        identifier: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Adjacency structure: space name to (destination space to transform id).
#[derive(Debug, Clone, Default)]
pub struct TransformGraph {
    links: IndexMap<String, IndexMap<String, String>>,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse a YAML description file.
    pub fn from_yaml_path(path: &Path) -> Result<Self, GraphError> {
        let content = fs::read(path)?;
        Self::from_yaml_slice(&content, &path.display().to_string())
    }

    /// Parse raw YAML bytes; a document that is not UTF-8 is `Malformed`.
    pub fn from_yaml_slice(content: &[u8], origin: &str) -> Result<Self, GraphError> {
        let description: Value = serde_yaml::from_slice(content)
            .map_err(|err| GraphError::Malformed(format!("{}: {}", origin, err)))?;
        Self::from_description(&description, origin)
    }

    /// Parse a YAML description. `origin` names the document in warnings.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, GraphError> {
        let description: Value = serde_yaml::from_str(content)
            .map_err(|err| GraphError::Malformed(format!("{}: {}", origin, err)))?;
        Self::from_description(&description, origin)
    }

    /// Build a graph from a nested mapping `space -> {destination -> transform id}`.
    ///
    /// Destinations that have no top-level entry of their own are added as
    /// spaces without outgoing links, with a warning for each one.
    pub fn from_description(description: &Value, origin: &str) -> Result<Self, GraphError> {
        let mapping = description.as_mapping().ok_or_else(|| {
            GraphError::Malformed(format!(
                "{}: top-level value must be a mapping of space names",
                origin
            ))
        })?;

        let mut links: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        for (source, targets) in mapping {
            let source = space_name(source, origin)?;
            let mut outgoing = IndexMap::new();
            match targets {
                Value::Null => {}
                Value::Mapping(targets) => {
                    for (target, transform) in targets {
                        let target = space_name(target, origin)?;
                        let transform = transform.as_str().ok_or_else(|| {
                            GraphError::Malformed(format!(
                                "{}: transform from {:?} to {:?} must be a string",
                                origin, source, target
                            ))
                        })?;
                        outgoing.insert(target, transform.to_string());
                    }
                }
                _ => {
                    return Err(GraphError::Malformed(format!(
                        "{}: links of space {:?} must be a mapping",
                        origin, source
                    )))
                }
            }
            links.insert(source, outgoing);
        }

        let referenced: Vec<String> = links
            .values()
            .flat_map(|targets| targets.keys())
            .cloned()
            .collect();
        for space in referenced {
            if !links.contains_key(&space) {
                tracing::warn!(
                    "Missing top-level entry for space {:?} in the YAML stream ({})",
                    space,
                    origin
                );
                links.insert(space, IndexMap::new());
            }
        }

        Ok(Self { links })
    }

    pub fn add_space(&mut self, name: &str) -> Result<(), GraphError> {
        if self.links.contains_key(name) {
            return Err(GraphError::DuplicateSpace(name.to_string()));
        }
        self.links.insert(name.to_string(), IndexMap::new());
        Ok(())
    }

    pub fn add_link(&mut self, from: &str, to: &str, transform_id: &str) -> Result<(), GraphError> {
        self.require_space(to)?;
        let outgoing = self
            .links
            .get_mut(from)
            .ok_or_else(|| GraphError::UnknownSpace(from.to_string()))?;
        if outgoing.contains_key(to) {
            return Err(GraphError::DuplicateLink {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        outgoing.insert(to.to_string(), transform_id.to_string());
        Ok(())
    }

    pub fn remove_link(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let outgoing = self
            .links
            .get_mut(from)
            .ok_or_else(|| GraphError::UnknownSpace(from.to_string()))?;
        // shift_remove keeps the order of the remaining links
        outgoing
            .shift_remove(to)
            .map(|_| ())
            .ok_or_else(|| GraphError::MissingLink {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Shortest chain of transform ids from `from` to `to`.
    ///
    /// Returns `Ok(Some(vec![]))` when both spaces are the same and `Ok(None)`
    /// when no chain exists. Both spaces must be registered.
    pub fn get_transform_chain(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<TransformChain>, GraphError> {
        self.require_space(from)?;
        self.require_space(to)?;

        let mut to_visit = VecDeque::from([from]);
        let mut back_pointers: HashMap<&str, Option<(&str, &str)>> = HashMap::new();
        back_pointers.insert(from, None);

        while let Some(space) = to_visit.pop_front() {
            // TODO: report same-length alternatives here instead of only in lint
            if space == to {
                let mut chain = Vec::new();
                let mut cursor = space;
                while let Some(&Some((previous, transform))) = back_pointers.get(cursor) {
                    chain.push(transform.to_string());
                    cursor = previous;
                }
                chain.reverse();
                return Ok(Some(chain));
            }

            for (target, transform) in self.links.get(space).into_iter().flatten() {
                if !back_pointers.contains_key(target.as_str()) {
                    back_pointers.insert(target.as_str(), Some((space, transform.as_str())));
                    to_visit.push_back(target.as_str());
                }
            }
        }

        Ok(None)
    }

    pub fn contains_space(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    /// Space names in declaration order.
    pub fn spaces(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// Outgoing links of `space` as `(destination, transform id)` pairs.
    pub fn links_from(&self, space: &str) -> Result<Vec<(&str, &str)>, GraphError> {
        let outgoing = self
            .links
            .get(space)
            .ok_or_else(|| GraphError::UnknownSpace(space.to_string()))?;
        Ok(outgoing
            .iter()
            .map(|(target, transform)| (target.as_str(), transform.as_str()))
            .collect())
    }

    pub fn space_count(&self) -> usize {
        self.links.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.values().map(IndexMap::len).sum()
    }

    fn require_space(&self, name: &str) -> Result<(), GraphError> {
        if self.links.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownSpace(name.to_string()))
        }
    }
}

fn space_name(value: &Value, origin: &str) -> Result<String, GraphError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        GraphError::Malformed(format!(
            "{}: space names must be strings, found {:?}",
            origin, value
        ))
    })
}
