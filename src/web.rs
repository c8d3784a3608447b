//! Browser bindings: the page DOM as a [`Document`], `localStorage` as a
//! [`SettingsStore`], and background geometry loading.

use crate::core::settings::SettingsStore;
use crate::geometry::{Atlas, GeometrySource, HttpFetcher};
use crate::render::{Document, HandleTable, NodeId};
use crate::{MapError, Result};
use std::cell::RefCell;
use std::sync::Arc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, SvgElement};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const SVG_TAGS: [&str; 5] = ["svg", "g", "path", "circle", "line"];

/// Route panics to the browser console
pub fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(value: JsValue) -> MapError {
    MapError::Dom(js_message(&value))
}

/// The live page, with elements handed out as [`NodeId`]s.
///
/// Elements found by `query` get a handle on first sight, so the handle
/// table sits behind a `RefCell`.
pub struct WebDocument {
    document: web_sys::Document,
    nodes: RefCell<HandleTable<Element>>,
}

impl WebDocument {
    /// Bind to the current window's document
    pub fn from_window() -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| MapError::Dom("no document in this context".into()))?;
        let body: Element = document
            .body()
            .ok_or_else(|| MapError::MissingElement("body".into()))?
            .into();

        Ok(Self {
            document,
            nodes: RefCell::new(HandleTable::new(body)),
        })
    }

    fn element(&self, node: NodeId) -> Result<Element> {
        self.nodes
            .borrow()
            .get(node)
            .cloned()
            .ok_or_else(|| MapError::Dom(format!("unknown node {}", node.0)))
    }

    /// Forget handles of elements no longer in the page
    fn prune(&self) {
        self.nodes.borrow_mut().retain(|element| element.is_connected());
    }
}

impl Document for WebDocument {
    fn root(&self) -> NodeId {
        HandleTable::<Element>::ROOT
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        let element = self.document.query_selector(selector).ok()??;
        Some(self.nodes.borrow_mut().find_or_insert(element))
    }

    fn create_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId> {
        let parent = self.element(parent)?;
        let element = if SVG_TAGS.contains(&tag) {
            self.document.create_element_ns(Some(SVG_NS), tag)
        } else {
            self.document.create_element(tag)
        }
        .map_err(js_error)?;
        parent.append_child(&element).map_err(js_error)?;
        Ok(self.nodes.borrow_mut().insert(element))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.element(node)?
            .set_attribute(name, value)
            .map_err(js_error)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node).ok()?.get_attribute(name)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self.element(node)?;
        let style = if let Some(html) = element.dyn_ref::<HtmlElement>() {
            html.style()
        } else if let Some(svg) = element.dyn_ref::<SvgElement>() {
            svg.style()
        } else {
            return Err(MapError::Dom(format!("node {} has no inline style", node.0)));
        };
        style.set_property(property, value).map_err(js_error)
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.element(node)?
            .class_list()
            .add_1(class)
            .map_err(js_error)
    }

    fn toggle_class(&mut self, node: NodeId, class: &str) -> Result<bool> {
        self.element(node)?
            .class_list()
            .toggle(class)
            .map_err(js_error)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_ok_and(|e| e.class_list().contains(class))
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.element(node)?.set_text_content(Some(text));
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<()> {
        let element = self.element(node)?;
        while let Some(child) = element.first_child() {
            element.remove_child(&child).map_err(js_error)?;
        }
        self.prune();
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        self.element(node)?.remove();
        self.prune();
        Ok(())
    }

    fn contains(&self, node: NodeId) -> bool {
        self.element(node).is_ok_and(|e| e.is_connected())
    }
}

/// Settings kept in the browser's `localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn from_window() -> Result<Self> {
        let storage = web_sys::window()
            .ok_or_else(|| MapError::Storage("no window".into()))?
            .local_storage()
            .map_err(|e| MapError::Storage(js_message(&e)))?
            .ok_or_else(|| MapError::Storage("localStorage is unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl SettingsStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| MapError::Storage(js_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| MapError::Storage(js_message(&e)))
    }
}

/// Fetch and decode `url` on the browser's event loop, then hand the atlas
/// (or the load error) to `on_ready`
pub fn load_in_background<F>(url: String, on_ready: F)
where
    F: FnOnce(Result<Arc<Atlas>>) + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let source = GeometrySource::new(HttpFetcher);
        let result = source.load(&url).await;
        if let Err(e) = &result {
            log::error!("{e}");
        }
        on_ready(result);
    });
}
