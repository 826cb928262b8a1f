use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One step of a [`NodePath`]: the containment property and the index
/// within that property's children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathSegment {
    pub property: String,
    pub index: usize,
}

/// Stable structural address of a node inside a document tree.
///
/// Rendered as `/statements@0/members@1`; the root is `/`. Paths survive
/// serialization, so a descriptor can name a node whose document is not
/// resident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn child(
        &self,
        property: &str,
        index: usize,
    ) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment {
            property: property.to_string(),
            index,
        });
        Self {
            segments,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self {
            segments,
        })
    }

    /// This path followed by each ancestor, ending at the root.
    pub fn ancestors(&self) -> Vec<NodePath> {
        let mut out = vec![self.clone()];
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            out.push(path);
        }
        out
    }
}

impl fmt::Display for NodePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}@{}", segment.property, segment.index)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNodePath(pub String);

impl fmt::Display for InvalidNodePath {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "invalid node path '{}'", self.0)
    }
}

impl std::error::Error for InvalidNodePath {}

impl FromStr for NodePath {
    type Err = InvalidNodePath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(rest) = s.strip_prefix('/') else {
            return Err(InvalidNodePath(s.to_string()));
        };
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let (property, index) = raw.split_once('@').ok_or_else(|| InvalidNodePath(s.to_string()))?;
            if property.is_empty() {
                return Err(InvalidNodePath(s.to_string()));
            }
            let index = index.parse::<usize>().map_err(|_| InvalidNodePath(s.to_string()))?;
            segments.push(PathSegment {
                property: property.to_string(),
                index,
            });
        }
        Ok(Self {
            segments,
        })
    }
}

impl TryFrom<String> for NodePath {
    type Error = InvalidNodePath;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/src/tree/path_tests.rs"]
mod tests;
