//! Name visibility: what each reference site can see, and the workspace
//! index of exported declarations and cross-document references.

mod computation;
mod index;
mod provider;
mod reflection;
mod stream;

pub use computation::{LocalScopes, compute_exports, compute_local_scopes};
pub use index::{ExportTable, IndexManager, ReferenceDescription};
pub use provider::{DefaultScopeProvider, ScopeError, ScopeProvider};
pub use reflection::{DefaultReflection, Reflection};
pub use stream::{GlobalScope, Scope, StreamScope};
