use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::identity::{ModelNodeId, Rdn};

/// Raw configuration element
///
/// The DOM-free shape of one XML element: filters are parsed from it,
/// `get`/`get-config` answer with it and `copy-config` consumes it. Leaves
/// carry `text`; containers and list entries carry `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigElement {
    /// Local name
    pub name: String,

    /// Namespace URI (empty when the element is unqualified)
    pub namespace: String,

    /// Text content, `None` when the element has no text node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child elements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigElement>,
}

impl ConfigElement {
    /// Element without text, to be filled with children
    pub fn container(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Element with text content
    pub fn leaf(
        namespace: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ConfigElement) -> Self {
        self.children.push(child);
        self
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&ConfigElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child leaf with the given local name
    pub fn leaf_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.text.is_some()
    }

    /// Non-blank text, trimmed
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Name and namespace check; an empty namespace on either side matches
    pub fn matches_name(&self, namespace: &str, name: &str) -> bool {
        self.name == name
            && (self.namespace.is_empty() || namespace.is_empty() || self.namespace == namespace)
    }

    fn addressed_by(&self, container: &Rdn, keys: &[Rdn]) -> bool {
        self.matches_name(container.namespace(), container.value())
            && keys
                .iter()
                .all(|k| self.leaf_text(k.name()).map(str::trim) == Some(k.value()))
    }

    /// Locate the element addressed by `id` among `roots`
    pub fn find_by_id<'a>(
        roots: &'a [ConfigElement],
        id: &ModelNodeId,
    ) -> Option<&'a ConfigElement> {
        let mut level = roots;
        let mut found = None;
        for (container, keys) in id.entries() {
            let element = level.iter().find(|e| e.addressed_by(container, keys))?;
            level = &element.children;
            found = Some(element);
        }
        found
    }

    /// Mutable variant of [`find_by_id`](Self::find_by_id)
    pub fn find_by_id_mut<'a>(
        roots: &'a mut [ConfigElement],
        id: &ModelNodeId,
    ) -> Option<&'a mut ConfigElement> {
        let mut blocks = id.entries().into_iter();
        let (container, keys) = blocks.next()?;
        let mut current = roots.iter_mut().find(|e| e.addressed_by(container, keys))?;
        for (container, keys) in blocks {
            current = current
                .children
                .iter_mut()
                .find(|e| e.addressed_by(container, keys))?;
        }
        Some(current)
    }

    /// Element addressed by `id`, created along with any missing ancestors
    ///
    /// Created list entries get their key leaves. Returns `None` only for
    /// the root identity.
    pub fn ensure_path<'a>(
        roots: &'a mut Vec<ConfigElement>,
        id: &ModelNodeId,
    ) -> Option<&'a mut ConfigElement> {
        create_missing(roots, id);
        Self::find_by_id_mut(roots, id)
    }

    /// Drop everything nested deeper than `depth` levels; 0 clears `elements`
    pub fn truncate_depth(elements: &mut Vec<ConfigElement>, depth: usize) {
        if depth == 0 {
            elements.clear();
            return;
        }
        for element in elements.iter_mut() {
            Self::truncate_depth(&mut element.children, depth - 1);
        }
    }

    /// # Errors
    ///
    /// `Serialization` if serde_json fails to render the element.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// `Serialization` when `json` is not a valid element.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn create_missing(roots: &mut Vec<ConfigElement>, id: &ModelNodeId) {
    let mut level = roots;
    for (container, keys) in id.entries() {
        let pos = match level.iter().position(|e| e.addressed_by(container, keys)) {
            Some(pos) => pos,
            None => {
                let mut created =
                    ConfigElement::container(container.namespace(), container.value());
                for key in keys {
                    created.children.push(ConfigElement::leaf(
                        key.namespace(),
                        key.name(),
                        key.value(),
                    ));
                }
                level.push(created);
                level.len() - 1
            }
        };
        level = &mut level[pos].children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:example:jukebox";

    fn library() -> Vec<ConfigElement> {
        vec![ConfigElement::container(NS, "jukebox").with_child(
            ConfigElement::container(NS, "library")
                .with_child(
                    ConfigElement::container(NS, "artist")
                        .with_child(ConfigElement::leaf(NS, "name", "Lenny")),
                )
                .with_child(
                    ConfigElement::container(NS, "artist")
                        .with_child(ConfigElement::leaf(NS, "name", "Prince")),
                ),
        )]
    }

    fn artist_id(name: &str) -> ModelNodeId {
        ModelNodeId::from_rdns(vec![
            Rdn::container(NS, "jukebox"),
            Rdn::container(NS, "library"),
            Rdn::container(NS, "artist"),
            Rdn::key(NS, "name", name),
        ])
    }

    #[test]
    fn test_find_by_id_matches_keys() {
        let roots = library();
        let prince = ConfigElement::find_by_id(&roots, &artist_id("Prince")).unwrap();
        assert_eq!(prince.leaf_text("name"), Some("Prince"));
        assert!(ConfigElement::find_by_id(&roots, &artist_id("Bowie")).is_none());
        assert!(ConfigElement::find_by_id(&roots, &ModelNodeId::new()).is_none());
    }

    #[test]
    fn test_ensure_path_creates_entry_with_keys() {
        let mut roots = library();
        let bowie = ConfigElement::ensure_path(&mut roots, &artist_id("Bowie")).unwrap();
        bowie.children.push(ConfigElement::leaf(NS, "rank", "1"));

        let library = &roots[0].children[0];
        assert_eq!(library.children.len(), 3);
        assert_eq!(library.children[2].leaf_text("name"), Some("Bowie"));
        assert_eq!(library.children[2].leaf_text("rank"), Some("1"));

        ConfigElement::ensure_path(&mut roots, &artist_id("Bowie")).unwrap();
        assert_eq!(roots[0].children[0].children.len(), 3);
    }

    #[test]
    fn test_json_round_trip() {
        let roots = library();
        let json = roots[0].to_json().unwrap();
        assert!(!json.contains("\"text\":null"));
        assert_eq!(ConfigElement::from_json(&json).unwrap(), roots[0]);
    }
}
