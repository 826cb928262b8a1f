pub(crate) mod handler;
pub(crate) mod navigation;
pub(crate) mod state;
pub(crate) mod workspace_scan;

pub use state::CrossrefLanguageServer;
