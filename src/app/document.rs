use crate::utils::{InstallerError, Logger, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<([a-zA-Z][\w-]*)([^>]*)>").unwrap());
static ID_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bid\s*=\s*["']([^"']+)["']"#).unwrap());
static TAG_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][\w-]*$").unwrap());

/// Index of an element in document order
pub type NodeId = usize;

/// The selector forms a mount target can be given in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Tag(String),
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            if TAG_NAME.is_match(id) {
                return Ok(Selector::Id(id.to_string()));
            }
        } else if TAG_NAME.is_match(selector) {
            return Ok(Selector::Tag(selector.to_ascii_lowercase()));
        }

        Err(InstallerError::InvalidSelector(selector.to_string()))
    }
}

/// The document an application is mounted into
pub trait HostDocument {
    /// First element matching the selector
    fn query_selector(&self, selector: &Selector) -> Option<NodeId>;

    /// Attach the named application to an element
    fn attach(&mut self, node: NodeId, app_name: &str) -> Result<()>;

    /// Name of the application mounted on an element, if any
    fn mounted_app(&self, node: NodeId) -> Option<&str>;
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
}

/// Element index built from static HTML, e.g. the project's index.html
#[derive(Debug, Default)]
pub struct StaticDocument {
    elements: Vec<Element>,
    mounts: HashMap<NodeId, String>,
}

impl StaticDocument {
    pub fn parse(html: &str) -> Self {
        let elements = OPEN_TAG
            .captures_iter(html)
            .map(|caps| Element {
                tag: caps[1].to_ascii_lowercase(),
                id: ID_ATTR.captures(&caps[2]).map(|id| id[1].to_string()),
            })
            .collect();

        Self {
            elements,
            mounts: HashMap::new(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }
}

impl HostDocument for StaticDocument {
    fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.elements.iter().position(|element| match selector {
            Selector::Id(id) => element.id.as_deref() == Some(id.as_str()),
            Selector::Tag(tag) => element.tag == *tag,
        })
    }

    fn attach(&mut self, node: NodeId, app_name: &str) -> Result<()> {
        if node >= self.elements.len() {
            return Err(InstallerError::MountTargetMissing(format!("node {}", node)));
        }

        if let Some(previous) = self.mounts.insert(node, app_name.to_string()) {
            Logger::warn(&format!(
                "There is already an app instance ({}) mounted on the host container",
                previous
            ));
        }
        Ok(())
    }

    fn mounted_app(&self, node: NodeId) -> Option<&str> {
        self.mounts.get(&node).map(String::as_str)
    }
}
