use super::item::ItemIndex;

/// Lowercase and trim a raw query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Ordered subsequence of the item index, by original item index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    members: Vec<usize>,
}

impl FilteredView {
    /// View containing every item.
    pub fn all(index: &ItemIndex) -> Self {
        Self {
            members: (0..index.len()).collect(),
        }
    }

    /// Recompute the view for `query` from scratch.
    pub fn compute(index: &ItemIndex, query: &str) -> Self {
        let query = normalize_query(query);
        let members = index
            .items()
            .iter()
            .filter(|item| item.matches(&query))
            .map(|item| item.index)
            .collect();
        Self { members }
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn contains(&self, index: usize) -> bool {
        // Members are sorted by construction.
        self.members.binary_search(&index).is_ok()
    }

    /// Position of an item within the view.
    pub fn position(&self, index: usize) -> Option<usize> {
        self.members.binary_search(&index).ok()
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.members.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
