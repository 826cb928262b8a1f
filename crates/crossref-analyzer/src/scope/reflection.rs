use crate::{linker::ReferenceSite, tree::NodeKind};

/// Type information about reference properties.
pub trait Reflection: Send + Sync {
    /// Kind of node a reference at `site` must resolve to.
    fn reference_type(
        &self,
        site: &ReferenceSite,
    ) -> NodeKind;
}

/// Both `uses` targets and member types name declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReflection;

impl Reflection for DefaultReflection {
    fn reference_type(
        &self,
        _site: &ReferenceSite,
    ) -> NodeKind {
        NodeKind::Declaration
    }
}
