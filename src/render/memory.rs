//! An in-memory element tree standing in for the browser DOM.

use super::document::{Document, NodeId};
use crate::{MapError, Result};
use fxhash::FxHashMap;
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            parent,
            ..Self::default()
        }
    }

    fn with_id(mut self, id: &str) -> Self {
        self.attributes.push(("id".into(), id.into()));
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn matches(&self, compound: &Compound) -> bool {
        compound.tag.as_deref().map_or(true, |tag| tag == "*" || tag == self.tag)
            && compound.id.as_deref().map_or(true, |id| self.get("id") == Some(id))
            && compound.classes.iter().all(|c| self.classes.contains(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(token: &str) -> Self {
        let mut compound = Compound::default();
        let mut kind = None;
        let mut current = String::new();

        let flush = |kind: Option<char>, current: &mut String, compound: &mut Compound| {
            if current.is_empty() {
                return;
            }
            let value = std::mem::take(current);
            match kind {
                Some('#') => compound.id = Some(value),
                Some('.') => compound.classes.push(value),
                _ => compound.tag = Some(value.to_ascii_lowercase()),
            }
        };

        for ch in token.chars() {
            if ch == '#' || ch == '.' {
                flush(kind, &mut current, &mut compound);
                kind = Some(ch);
            } else {
                current.push(ch);
            }
        }
        flush(kind, &mut current, &mut compound);
        compound
    }
}

fn parse_selector(selector: &str) -> Vec<(Combinator, Compound)> {
    let spaced = selector.replace('>', " > ");
    let mut steps = Vec::new();
    let mut combinator = Combinator::Descendant;
    for token in spaced.split_whitespace() {
        if token == ">" {
            combinator = Combinator::Child;
        } else {
            steps.push((combinator, Compound::parse(token)));
            combinator = Combinator::Descendant;
        }
    }
    steps
}

/// Element tree kept in an arena keyed by [`NodeId`]
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: FxHashMap<NodeId, Element>,
    root: NodeId,
    next_id: u64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document holding only `<body>`
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = FxHashMap::default();
        nodes.insert(root, Element::new("body", None));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    /// A document with the elements the map expects from its host page:
    /// the settings panel with its toggle button and projection dropdown,
    /// the map container and the route list
    pub fn host_page() -> Self {
        let mut doc = Self::new();
        let body = doc.root;

        let settings = doc.append(body, Element::new("div", None).with_id("settings-container"));
        let button = Element::new("button", None).with_id("settings-button");
        doc.append(settings, Element { text: Some("Settings".into()), ..button });
        doc.append(settings, Element::new("select", None).with_id("settings-dropdown"));

        doc.append(body, Element::new("div", None).with_id("map-container"));

        let route = doc.append(body, Element::new("div", None).with_id("route-selected-container"));
        doc.append(route, Element::new("ol", None));
        doc
    }

    /// Link `element` under `parent`, which must already be in the arena
    fn append(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        if let Some(parent_element) = self.nodes.get_mut(&parent) {
            parent_element.children.push(id);
            element.parent = Some(parent);
        }
        self.nodes.insert(id, element);
        id
    }

    fn element(&self, node: NodeId) -> Result<&Element> {
        self.nodes
            .get(&node)
            .ok_or_else(|| MapError::Dom(format!("unknown node {}", node.0)))
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| MapError::Dom(format!("unknown node {}", node.0)))
    }

    /// Every element matching `selector`, in document order
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let steps = parse_selector(selector);
        if steps.is_empty() {
            return Vec::new();
        }
        self.descendants(self.root)
            .into_iter()
            .filter(|&node| self.matches(node, &steps, steps.len() - 1))
            .collect()
    }

    /// Elements whose attribute `name` equals `value`, in document order
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.nodes.get(node).and_then(|e| e.get(name)) == Some(value))
            .collect()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|e| e.parent)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.tag.as_str())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.text.as_deref())
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| {
            e.styles
                .iter()
                .find(|(key, _)| key == property)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Number of live elements, `<body>` included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the subtree rooted at `node` as markup
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(&mut out, node);
        out
    }

    fn write_markup(&self, out: &mut String, node: NodeId) {
        let Some(element) = self.nodes.get(&node) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        for (key, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value));
        }
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&element.classes.join(" ")));
        }
        if !element.styles.is_empty() {
            let _ = write!(out, " style=\"{}\"", escape(&style_text(&element.styles)));
        }
        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape(text));
        }
        for &child in &element.children {
            self.write_markup(out, child);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    fn matches(&self, node: NodeId, steps: &[(Combinator, Compound)], index: usize) -> bool {
        let Some(element) = self.nodes.get(&node) else {
            return false;
        };
        let (combinator, compound) = &steps[index];
        if !element.matches(compound) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => element
                .parent
                .is_some_and(|parent| self.matches(parent, steps, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = element.parent;
                while let Some(current) = ancestor {
                    if self.matches(current, steps, index - 1) {
                        return true;
                    }
                    ancestor = self.parent(current);
                }
                false
            }
        }
    }
}

fn style_text(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(key, value)| format!("{key}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Document for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn create_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        self.element(parent)?;
        Ok(self.append(parent, Element::new(tag, Some(parent))))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        match name {
            "class" => {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "style" => {
                element.styles = value
                    .split(';')
                    .filter_map(|decl| decl.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
            }
            _ => match element.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => element.attributes.push((name.to_string(), value.to_string())),
            },
        }
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let element = self.nodes.get(&node)?;
        match name {
            "class" if !element.classes.is_empty() => Some(element.classes.join(" ")),
            "style" if !element.styles.is_empty() => Some(style_text(&element.styles)),
            _ => element.get(name).map(str::to_string),
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        match element.styles.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.styles.push((property.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let element = self.element_mut(node)?;
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool> {
        let element = self.element_mut(node)?;
        if let Some(pos) = element.classes.iter().position(|c| c == class) {
            element.classes.remove(pos);
            Ok(false)
        } else {
            element.classes.push(class.to_string());
            Ok(true)
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element_mut(node)?.text = Some(text.to_string());
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for child in children {
            self.drop_subtree(child);
        }
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(MapError::Dom("cannot remove the document root".into()));
        }
        let parent = self.element(node)?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != node);
        }
        self.drop_subtree(node);
        Ok(())
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }
}

impl MemoryDocument {
    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(element) = self.nodes.remove(&node) {
            for child in element.children {
                self.drop_subtree(child);
            }
        }
    }
}
