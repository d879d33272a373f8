use std::collections::BTreeSet;
use crate::models::AnalysisRecord;

/// Set of selected record ids, as driven by row checkboxes and a
/// "select all" box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { ids: ids.into_iter().map(Into::into).filter(|id: &String| !id.trim().is_empty()).collect() }
    }

    /// Flip one id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// If every visible id is already selected, clear the selection;
    /// otherwise select exactly the visible ids.
    pub fn toggle_all<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: BTreeSet<String> = visible.into_iter().map(str::to_string).collect();
        if !visible.is_empty() && visible.is_subset(&self.ids) {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Records to export: the selected ones, or all of them when nothing is
    /// selected.
    pub fn retain<R: AnalysisRecord + Clone>(&self, records: &[R]) -> Vec<R> {
        records
            .iter()
            .filter(|r| self.ids.is_empty() || self.ids.contains(r.id()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_single() {
        let mut sel = Selection::new();
        assert!(sel.toggle("a"));
        assert!(sel.is_selected("a"));
        assert!(!sel.toggle("a"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_all_selects_then_clears() {
        let mut sel = Selection::new();
        sel.toggle_all(["a", "b", "c"]);
        assert_eq!(sel.len(), 3);
        sel.toggle_all(["a", "b", "c"]);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_all_with_partial_selection_selects_visible() {
        let mut sel = Selection::new();
        sel.toggle("a");
        sel.toggle("zzz");
        sel.toggle_all(["a", "b"]);
        assert_eq!(sel.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_all_with_nothing_visible() {
        let mut sel = Selection::new();
        sel.toggle("a");
        sel.toggle_all(std::iter::empty());
        assert!(sel.is_empty());
    }
}
