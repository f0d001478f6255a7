use super::filter::FilteredView;

/// Modal viewer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lightbox {
    #[default]
    Closed,
    Open { current: usize },
}

impl Lightbox {
    pub fn is_open(&self) -> bool {
        matches!(self, Lightbox::Open { .. })
    }

    pub fn current(&self) -> Option<usize> {
        match self {
            Lightbox::Open { current } => Some(*current),
            Lightbox::Closed => None,
        }
    }
}

/// Resolve the item `delta` steps away from `current`.
///
/// Walks the filtered view when it has members, the whole index otherwise,
/// wrapping in both directions. An item outside the operating set counts as
/// position 0. Returns `None` when there is nothing to walk.
pub fn navigation_target(
    index_len: usize,
    filtered: &FilteredView,
    current: usize,
    delta: isize,
) -> Option<usize> {
    if filtered.is_empty() {
        if index_len == 0 {
            return None;
        }
        let size = index_len as isize;
        let position = if current < index_len { current } else { 0 };
        let next = (position as isize + delta).rem_euclid(size);
        return Some(next as usize);
    }

    let size = filtered.len() as isize;
    let position = filtered.position(current).unwrap_or(0);
    let next = (position as isize + delta).rem_euclid(size);
    filtered.get(next as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::item::ItemIndex;
    use crate::page::{ElementId, ImageElement};
    use std::path::PathBuf;

    fn index(captions: &[&str]) -> ItemIndex {
        let elements: Vec<_> = captions
            .iter()
            .enumerate()
            .map(|(i, alt)| ImageElement {
                handle: ElementId(i),
                src: PathBuf::from(format!("/tmp/{i}.jpg")),
                alt: Some(alt.to_string()),
                data_tags: None,
            })
            .collect();
        ItemIndex::scan(&elements)
    }

    #[test]
    fn wraps_forward_and_backward_over_full_index() {
        let idx = index(&["a", "b", "c"]);
        let all = FilteredView::all(&idx);
        assert_eq!(navigation_target(3, &all, 2, 1), Some(0));
        assert_eq!(navigation_target(3, &all, 0, -1), Some(2));
        assert_eq!(navigation_target(3, &all, 1, 1), Some(2));
    }

    #[test]
    fn walks_filtered_members_only() {
        let idx = index(&["Desert", "Ocean", "Desert Night"]);
        let view = FilteredView::compute(&idx, "desert");
        assert_eq!(navigation_target(3, &view, 0, 1), Some(2));
        assert_eq!(navigation_target(3, &view, 2, 1), Some(0));
        assert_eq!(navigation_target(3, &view, 0, -1), Some(2));
    }

    #[test]
    fn current_outside_filter_counts_as_position_zero() {
        let idx = index(&["Desert", "Ocean", "Desert Night"]);
        let view = FilteredView::compute(&idx, "desert");
        // Item 1 (Ocean) is not in the view: treated as position 0 -> [0, 2][1].
        assert_eq!(navigation_target(3, &view, 1, 1), Some(2));
        assert_eq!(navigation_target(3, &view, 1, -1), Some(2));
    }

    #[test]
    fn empty_filter_falls_back_to_full_index() {
        let idx = index(&["a", "b"]);
        let none = FilteredView::compute(&idx, "zzz");
        assert!(none.is_empty());
        assert_eq!(navigation_target(2, &none, 0, 1), Some(1));
    }

    #[test]
    fn nothing_to_walk_yields_none() {
        assert_eq!(navigation_target(0, &FilteredView::default(), 0, 1), None);
    }

    #[test]
    fn plus_then_minus_is_identity() {
        let idx = index(&["a", "b", "c", "d"]);
        let all = FilteredView::all(&idx);
        for start in 0..4 {
            let fwd = navigation_target(4, &all, start, 1).unwrap();
            assert_eq!(navigation_target(4, &all, fwd, -1), Some(start));
        }
    }

    #[test]
    fn lightbox_state_accessors() {
        assert!(!Lightbox::Closed.is_open());
        assert_eq!(Lightbox::Closed.current(), None);
        let open = Lightbox::Open { current: 3 };
        assert!(open.is_open());
        assert_eq!(open.current(), Some(3));
    }
}
