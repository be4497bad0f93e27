#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileKind {
    CPlusPlus,
    Header,
    Unknown,
}

impl FileKind {
    pub(crate) fn for_name(name: &str) -> Self {
        if name.ends_with(".cpp") {
            FileKind::CPlusPlus
        } else if name.ends_with(".h") {
            FileKind::Header
        } else {
            FileKind::Unknown
        }
    }

    pub(crate) fn icon(self) -> &'static str {
        match self {
            FileKind::CPlusPlus => "C++",
            FileKind::Header => " H ",
            FileKind::Unknown => " · ",
        }
    }
}

/// Rows shown in the locator popup; one file name per row.
#[derive(Debug, Clone, Default)]
pub(crate) struct SuggestionModel {
    suggestions: Vec<String>,
}

impl SuggestionModel {
    pub(crate) fn new(suggestions: Vec<String>) -> Self {
        Self { suggestions }
    }

    pub(crate) fn row_count(&self) -> usize {
        self.suggestions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub(crate) fn is_valid_row(&self, row: usize) -> bool {
        row < self.suggestions.len()
    }

    pub(crate) fn name(&self, row: usize) -> Option<&str> {
        self.suggestions.get(row).map(String::as_str)
    }

    pub(crate) fn kind(&self, row: usize) -> Option<FileKind> {
        self.name(row).map(FileKind::for_name)
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &str> {
        self.suggestions.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;

    #[test]
    fn test_file_kind_by_suffix() {
        assert_eq!(FileKind::for_name("Editor.cpp"), FileKind::CPlusPlus);
        assert_eq!(FileKind::for_name("Editor.h"), FileKind::Header);
        assert_eq!(FileKind::for_name("Makefile"), FileKind::Unknown);
        assert_eq!(FileKind::for_name("notes.hpp"), FileKind::Unknown);
        assert_eq!(FileKind::for_name("main.cpp.orig"), FileKind::Unknown);
    }

    #[test]
    fn test_model_rows() {
        let model = SuggestionModel::new(vec!["a.cpp".to_string(), "b.h".to_string()]);
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.name(1), Some("b.h"));
        assert_eq!(model.kind(0), Some(FileKind::CPlusPlus));
        assert_eq!(model.kind(1), Some(FileKind::Header));
        assert!(model.name(2).is_none());
        assert!(model.is_valid_row(1));
        assert!(!model.is_valid_row(2));
        assert_eq!(model.rows().collect::<Vec<_>>(), vec!["a.cpp", "b.h"]);
    }

    #[test]
    fn test_empty_model() {
        let model = SuggestionModel::default();
        assert!(model.is_empty());
        assert!(!model.is_valid_row(0));
        assert!(model.kind(0).is_none());
    }
}
