//! Semantic tree: the nodes reference sites live in, their structural
//! addresses, and lookup by address.

mod builder;
mod locator;
mod node;
mod path;

pub use builder::build;
pub use locator::locate;
pub use node::{AstNode, MEMBERS, NodeKind, Preorder, STATEMENTS, TARGET, TYPE};
pub use path::{InvalidNodePath, NodePath, PathSegment};
