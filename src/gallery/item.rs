use crate::page::{ElementId, ImageElement};
use std::path::PathBuf;

/// One gallery photo. Built once at scan time, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub index: usize,
    pub element: ElementId,
    pub source: PathBuf,
    pub caption: String,
    pub tags: Vec<String>,
}

impl Item {
    /// Case-insensitive substring match on caption or space-joined tags.
    ///
    /// `query` must already be normalized (see [`super::filter::normalize_query`]).
    pub fn matches(&self, query: &str) -> bool {
        self.caption.to_lowercase().contains(query)
            || self.tags.join(" ").to_lowercase().contains(query)
    }

    /// Caption shown in the lightbox slot.
    pub fn display_caption(&self) -> &str {
        if self.caption.is_empty() {
            "Photo"
        } else {
            &self.caption
        }
    }
}

/// Ordered list of every item in the page.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    items: Vec<Item>,
}

impl ItemIndex {
    /// Index the page's image elements in document order.
    pub fn scan(elements: &[ImageElement]) -> Self {
        let items = elements
            .iter()
            .enumerate()
            .map(|(index, el)| Item {
                index,
                element: el.handle,
                source: el.src.clone(),
                caption: el.alt.clone().unwrap_or_default(),
                tags: parse_tags(el.data_tags.as_deref()),
            })
            .collect();

        Self { items }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split a comma-separated attribute, trimming and dropping empty parts.
pub fn parse_tags(attr: Option<&str>) -> Vec<String> {
    attr.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(i: usize, alt: Option<&str>, tags: Option<&str>) -> ImageElement {
        ImageElement {
            handle: ElementId(i),
            src: PathBuf::from(format!("/tmp/{i}.jpg")),
            alt: alt.map(str::to_string),
            data_tags: tags.map(str::to_string),
        }
    }

    #[test]
    fn scan_assigns_sequential_indices_in_document_order() {
        let index = ItemIndex::scan(&[
            element(0, Some("Desert"), Some("sand,sunset")),
            element(1, None, None),
            element(2, Some("Night"), Some(" , stars ,, ")),
        ]);

        assert_eq!(index.len(), 3);
        let indices: Vec<_> = index.items().iter().map(|i| i.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(index.get(1).unwrap().caption, "");
        assert!(index.get(1).unwrap().tags.is_empty());
        assert_eq!(index.get(2).unwrap().tags, vec!["stars"]);
    }

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(parse_tags(Some("a, b ,c")), vec!["a", "b", "c"]);
        assert_eq!(parse_tags(Some("dup,dup")), vec!["dup", "dup"]);
        assert!(parse_tags(Some("")).is_empty());
        assert!(parse_tags(None).is_empty());
    }

    #[test]
    fn matches_checks_caption_and_joined_tags() {
        let index = ItemIndex::scan(&[element(0, Some("Desert"), Some("Sand,Sunset"))]);
        let item = index.get(0).unwrap();
        assert!(item.matches("des"));
        assert!(item.matches("sunset"));
        // Tags are joined by a single space before matching.
        assert!(item.matches("sand sun"));
        assert!(!item.matches("ocean"));
        assert!(item.matches(""));
    }

    #[test]
    fn display_caption_falls_back_to_photo() {
        let index = ItemIndex::scan(&[element(0, None, None)]);
        assert_eq!(index.get(0).unwrap().display_caption(), "Photo");
    }

    #[test]
    fn empty_scan_is_empty() {
        let index = ItemIndex::scan(&[]);
        assert!(index.is_empty());
    }
}
