//! Arena-backed drawing tree.
//!
//! Elements live in one `Vec` and refer to each other by [`ElementId`]; every element knows
//! its parent, so absolute positions can be resolved by walking up. Detached elements stay in
//! the arena but are no longer reachable from the root and are not serialized.

use crate::util::escape_xml_into;
use crate::{Error, Result};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: IndexMap<String, String>,
    /// Text content, escaped on output.
    pub text: Option<String>,
    /// Well-formed inner markup written verbatim after the children.
    pub markup: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: IndexMap::new(),
            text: None,
            markup: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    elements: Vec<Element>,
}

impl Drawing {
    pub fn new(root_tag: &str) -> Self {
        Self {
            elements: vec![Element::new(root_tag, None)],
        }
    }

    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.get(id).ok_or_else(|| Error::missing(id.to_string()))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id.0)
            .ok_or_else(|| Error::missing(id.to_string()))
    }

    /// Appends a new `tag` element as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, tag: &str) -> Result<ElementId> {
        let id = ElementId(self.elements.len());
        self.element_mut(parent)?.children.push(id);
        self.elements.push(Element::new(tag, Some(parent)));
        Ok(id)
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).and_then(|e| e.attr(name))
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) -> Result<()> {
        self.element_mut(id)?
            .attrs
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) -> Result<Option<String>> {
        Ok(self.element_mut(id)?.attrs.shift_remove(name))
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.element_mut(id)?.text = Some(text.into());
        Ok(())
    }

    pub fn set_markup(&mut self, id: ElementId, markup: impl Into<String>) -> Result<()> {
        self.element_mut(id)?.markup = Some(markup.into());
        Ok(())
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id).is_some_and(|e| e.has_class(class))
    }

    /// Adds or removes one class, leaving the others in place.
    pub fn set_class(&mut self, id: ElementId, class: &str, on: bool) -> Result<()> {
        let element = self.element_mut(id)?;
        let mut classes: Vec<String> = element.classes().map(str::to_string).collect();
        let present = classes.iter().any(|c| c == class);
        if on == present {
            return Ok(());
        }
        if on {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        if classes.is_empty() {
            element.attrs.shift_remove("class");
        } else {
            element.attrs.insert("class".to_string(), classes.join(" "));
        }
        Ok(())
    }

    /// Unlinks `id` (and its subtree) from its parent.
    pub fn detach(&mut self, id: ElementId) -> Result<()> {
        let parent = self.element_mut(id)?.parent.take();
        if let Some(parent) = parent {
            self.element_mut(parent)?.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.get(id).and_then(Element::parent), |&p| {
            self.get(p).and_then(Element::parent)
        })
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: ElementId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Descendants of `id` in document order, `id` excluded.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.get(id) {
            Some(e) => e.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(e) = self.get(next) {
                stack.extend(e.children.iter().rev().copied());
            }
        }
        out
    }

    /// Attached elements with the given tag, in document order.
    pub fn select_tag(&self, tag: &str) -> Vec<ElementId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(|e| e.tag == tag))
            .collect()
    }

    /// Attached elements carrying `class`, optionally restricted to one tag.
    pub fn select_class(&self, tag: Option<&str>, class: &str) -> Vec<ElementId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .is_some_and(|e| tag.is_none_or(|t| e.tag == t) && e.has_class(class))
            })
            .collect()
    }

    /// The attached element whose `id` attribute is `dom_id`.
    pub fn find_by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(dom_id))
    }

    /// First direct child of `parent` carrying `class`.
    pub fn child_with_class(&self, parent: ElementId, class: &str) -> Option<ElementId> {
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.has_class(c, class))
    }

    /// First descendant of `parent` with the given tag.
    pub fn find_tag(&self, parent: ElementId, tag: &str) -> Option<ElementId> {
        self.descendants(parent)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(|e| e.tag == tag))
    }

    /// Number of elements reachable from the root, the root included.
    pub fn element_count(&self) -> usize {
        self.descendants(self.root()).len() + 1
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(self.elements.len() * 64);
        self.write_element(self.root(), &mut out);
        out
    }

    fn write_element(&self, id: ElementId, out: &mut String) {
        let Some(e) = self.get(id) else {
            return;
        };
        out.push('<');
        out.push_str(&e.tag);
        for (name, value) in &e.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_xml_into(out, value);
            out.push('"');
        }
        if e.children.is_empty() && e.text.is_none() && e.markup.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &e.text {
            escape_xml_into(out, text);
        }
        for &child in &e.children {
            self.write_element(child, out);
        }
        if let Some(markup) = &e.markup {
            out.push_str(markup);
        }
        out.push_str("</");
        out.push_str(&e.tag);
        out.push('>');
    }
}
