use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Locator,
    Viewer,
}

/// File currently shown in the viewer pane.
#[derive(Debug, Clone)]
pub(crate) struct OpenedFile {
    /// Project-relative name as listed by the project.
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) lines: Vec<String>,
    pub(crate) scroll: usize,
}
