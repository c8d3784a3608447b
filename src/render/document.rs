use crate::Result;
use fxhash::FxHashMap;

/// Handle to an element of a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// The slice of a DOM the map needs: element creation, attributes, inline
/// styles, classes, text and removal.
///
/// Implemented by [`super::MemoryDocument`] for tests and headless rendering,
/// and by `web::WebDocument` in the browser.
pub trait Document {
    /// The `<body>` (or equivalent) element
    fn root(&self) -> NodeId;

    /// First element matching a selector of `tag`, `#id` and `.class`
    /// compounds joined by child (`>`) or descendant combinators
    fn query(&self, selector: &str) -> Option<NodeId>;

    fn create_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()>;

    /// Flip a class, returning whether it is now present
    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    fn clear_children(&mut self, node: NodeId) -> Result<()>;

    /// Detach an element and everything below it
    fn remove(&mut self, node: NodeId) -> Result<()>;

    fn contains(&self, node: NodeId) -> bool;
}

/// Handles for elements owned by a host DOM, with the root fixed at `NodeId(0)`.
///
/// Freshly created elements go through [`HandleTable::insert`]; only elements
/// that may already have a handle (query results) pay for the equality scan
/// in [`HandleTable::find_or_insert`].
#[derive(Debug, Clone)]
pub struct HandleTable<E> {
    elements: FxHashMap<NodeId, E>,
    next_id: u64,
}

impl<E> HandleTable<E> {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(root: E) -> Self {
        let mut elements = FxHashMap::default();
        elements.insert(Self::ROOT, root);
        Self { elements, next_id: 1 }
    }

    pub fn get(&self, node: NodeId) -> Option<&E> {
        self.elements.get(&node)
    }

    pub fn insert(&mut self, element: E) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, element);
        id
    }

    /// Drop every handle except the root whose element fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) {
        self.elements
            .retain(|&id, element| id == Self::ROOT || keep(element));
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<E: PartialEq> HandleTable<E> {
    /// Reuse the handle of an element already in the table
    pub fn find_or_insert(&mut self, element: E) -> NodeId {
        let known = self
            .elements
            .iter()
            .find(|(_, known)| **known == element)
            .map(|(&id, _)| id);
        known.unwrap_or_else(|| self.insert(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Element stand-in that counts equality checks
    #[derive(Debug)]
    struct Counted {
        key: u32,
        comparisons: Rc<Cell<usize>>,
    }

    impl PartialEq for Counted {
        fn eq(&self, other: &Self) -> bool {
            self.comparisons.set(self.comparisons.get() + 1);
            self.key == other.key
        }
    }

    #[test]
    fn test_insert_never_compares_elements() {
        let comparisons = Rc::new(Cell::new(0));
        let counted = |key| Counted {
            key,
            comparisons: comparisons.clone(),
        };

        let mut table = HandleTable::new(counted(0));
        let ids: Vec<_> = (1..=500).map(|key| table.insert(counted(key))).collect();

        assert_eq!(comparisons.get(), 0);
        assert_eq!(table.len(), 501);
        assert_eq!(ids.first(), Some(&NodeId(1)));
        assert_eq!(ids.last(), Some(&NodeId(500)));
    }

    #[test]
    fn test_find_or_insert_reuses_known_handles() {
        let mut table = HandleTable::new("body");
        let svg = table.insert("svg");
        assert_eq!(table.find_or_insert("svg"), svg);
        assert_eq!(table.find_or_insert("body"), HandleTable::<&str>::ROOT);

        let g = table.find_or_insert("g");
        assert_ne!(g, svg);
        assert_eq!(table.get(g), Some(&"g"));
    }

    #[test]
    fn test_retain_keeps_the_root() {
        let mut table = HandleTable::new(false);
        let live = table.insert(true);
        let dead = table.insert(false);
        table.retain(|connected| *connected);

        assert!(table.get(HandleTable::<bool>::ROOT).is_some());
        assert!(table.get(live).is_some());
        assert!(table.get(dead).is_none());
    }
}
