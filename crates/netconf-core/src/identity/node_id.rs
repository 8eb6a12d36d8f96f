use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::natural::natural_cmp;
use super::rdn::Rdn;
use crate::errors::{NetconfError, Result};
use crate::model::SchemaPath;

/// Canonical hierarchical key of a configuration node
///
/// A sequence of [`Rdn`]s alternating container hops and list-entry keys,
/// e.g. `/container=jukebox/container=library/container=artist/name=Lenny`.
///
/// Equality and hashing look at the Rdns only. The rendered path strings are
/// computed on first use and reset by every mutating method.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ModelNodeId {
    rdns: Vec<Rdn>,
    #[serde(skip)]
    path_cache: OnceCell<String>,
    #[serde(skip)]
    xpath_cache: OnceCell<String>,
}

impl ModelNodeId {
    /// The empty identity (the datastore root)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self {
            rdns,
            ..Self::default()
        }
    }

    /// Parse `/name=value/name=value...`, giving every Rdn `namespace`
    ///
    /// `\` escapes `/`, `=` and `\` inside names and values.
    ///
    /// # Errors
    ///
    /// Returns `MalformedNodeId` naming the offending segment when a segment
    /// is empty, has no `=`, has an empty name, or ends in a dangling escape.
    pub fn from_path_string(path: &str, namespace: &str) -> Result<Self> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Ok(Self::new());
        }

        let mut rdns = Vec::new();
        for (position, segment) in split_unescaped(trimmed, '/')?.into_iter().enumerate() {
            if segment.is_empty() {
                return Err(NetconfError::MalformedNodeId {
                    segment,
                    reason: format!("empty segment at position {}", position + 1),
                });
            }
            let parts = split_unescaped(&segment, '=')?;
            if parts.len() < 2 {
                return Err(NetconfError::MalformedNodeId {
                    segment,
                    reason: "missing '='".to_string(),
                });
            }
            let name = unescape(&parts[0]);
            if name.is_empty() {
                return Err(NetconfError::MalformedNodeId {
                    segment,
                    reason: "empty Rdn name".to_string(),
                });
            }
            // anything after the first '=' belongs to the value
            let value = unescape(&parts[1..].join("\\="));
            rdns.push(Rdn::new(name, namespace, value));
        }
        Ok(Self::from_rdns(rdns))
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// True for the datastore root
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn add_rdn(&mut self, rdn: Rdn) {
        self.rdns.push(rdn);
        self.invalidate();
    }

    pub fn add_rdns(&mut self, rdns: impl IntoIterator<Item = Rdn>) {
        self.rdns.extend(rdns);
        self.invalidate();
    }

    /// Builder form of [`add_rdn`](Self::add_rdn)
    pub fn with_rdn(mut self, rdn: Rdn) -> Self {
        self.add_rdn(rdn);
        self
    }

    /// Drop the first `n` Rdns (all of them if `n` exceeds the length)
    pub fn remove_first(&mut self, n: usize) {
        let n = n.min(self.rdns.len());
        self.rdns.drain(..n);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.path_cache = OnceCell::new();
        self.xpath_cache = OnceCell::new();
    }

    /// Identity of the node that contains this one
    ///
    /// Drops trailing key Rdns and the container Rdn before them. `None` for
    /// the root.
    pub fn parent_id(&self) -> Option<ModelNodeId> {
        if self.rdns.is_empty() {
            return None;
        }
        let mut end = self.rdns.len();
        while end > 0 && !self.rdns[end - 1].is_container() {
            end -= 1;
        }
        let end = end.saturating_sub(1);
        Some(Self::from_rdns(self.rdns[..end].to_vec()))
    }

    /// Number of container hops
    pub fn depth(&self) -> usize {
        self.rdns.iter().filter(|r| r.is_container()).count()
    }

    /// Last container hop, i.e. the node's own name
    pub fn last_container(&self) -> Option<&Rdn> {
        self.rdns.iter().rev().find(|r| r.is_container())
    }

    /// (container, keys) pairs, one per structural hop
    ///
    /// Key Rdns before the first container hop are skipped.
    pub fn entries(&self) -> Vec<(&Rdn, &[Rdn])> {
        let rdns = &self.rdns;
        let mut out = Vec::new();
        let mut i = 0;
        while i < rdns.len() {
            if !rdns[i].is_container() {
                i += 1;
                continue;
            }
            let mut end = i + 1;
            while end < rdns.len() && !rdns[end].is_container() {
                end += 1;
            }
            out.push((&rdns[i], &rdns[i + 1..end]));
            i = end;
        }
        out
    }

    /// Key Rdns that follow the last container hop
    pub fn trailing_keys(&self) -> &[Rdn] {
        let start = self
            .rdns
            .iter()
            .rposition(|r| r.is_container())
            .map(|i| i + 1)
            .unwrap_or(0);
        &self.rdns[start..]
    }

    /// Schema location: container hops only
    pub fn schema_path(&self) -> SchemaPath {
        SchemaPath::from_qnames(
            self.rdns
                .iter()
                .filter(|r| r.is_container())
                .map(|r| r.qname())
                .collect(),
        )
    }

    /// `/name=value/...` rendering, the inverse of
    /// [`from_path_string`](Self::from_path_string)
    pub fn path_string(&self) -> &str {
        self.path_cache.get_or_init(|| {
            let mut out = String::new();
            for rdn in &self.rdns {
                out.push('/');
                out.push_str(&escape(rdn.name()));
                out.push('=');
                out.push_str(&escape(rdn.value()));
            }
            if out.is_empty() {
                out.push('/');
            }
            out
        })
    }

    /// `/artist[name='Lenny']/album[name='Circus']` rendering
    pub fn xpath_string(&self) -> &str {
        self.xpath_cache.get_or_init(|| {
            let mut out = String::new();
            for rdn in &self.rdns {
                if rdn.is_container() {
                    out.push('/');
                    out.push_str(rdn.value());
                } else {
                    out.push_str(&key_predicate(rdn.name(), rdn.value()));
                }
            }
            if out.is_empty() {
                out.push('/');
            }
            out
        })
    }

    /// True if `prefix`'s Rdns are a prefix of this identity's Rdns
    pub fn begins_with(&self, prefix: &ModelNodeId) -> bool {
        prefix.rdns.len() <= self.rdns.len()
            && prefix.rdns.iter().zip(self.rdns.iter()).all(|(p, s)| p == s)
    }

    /// Structural prefix check that ignores key values
    ///
    /// Container hops must match exactly; key Rdns only by name and
    /// namespace.
    pub fn begins_with_template(&self, template: &ModelNodeId) -> bool {
        template.rdns.len() <= self.rdns.len()
            && template
                .rdns
                .iter()
                .zip(self.rdns.iter())
                .all(|(t, s)| {
                    if t.is_container() {
                        t == s
                    } else {
                        !s.is_container() && t.same_kind(s)
                    }
                })
    }

    /// Like [`begins_with_template`](Self::begins_with_template) but a list
    /// entry's composite keys may appear in any order
    pub fn begins_with_template_ignore_key_order(&self, template: &ModelNodeId) -> bool {
        let own = self.entry_blocks();
        let tmpl = template.entry_blocks();
        if tmpl.len() > own.len() {
            return false;
        }
        tmpl.iter().zip(own.iter()).all(|(t, o)| {
            if t.container != o.container {
                return false;
            }
            let own_keys: BTreeSet<(&str, &str)> =
                o.keys.iter().map(|k| (k.name(), k.namespace())).collect();
            t.keys
                .iter()
                .all(|k| own_keys.contains(&(k.name(), k.namespace())))
        })
    }

    fn entry_blocks(&self) -> Vec<EntryBlock<'_>> {
        let mut blocks: Vec<EntryBlock<'_>> = Vec::new();
        for rdn in &self.rdns {
            if rdn.is_container() {
                blocks.push(EntryBlock {
                    container: Some(rdn),
                    keys: Vec::new(),
                });
            } else if let Some(last) = blocks.last_mut() {
                last.keys.push(rdn);
            } else {
                blocks.push(EntryBlock {
                    container: None,
                    keys: vec![rdn],
                });
            }
        }
        blocks
    }

    /// Identity one structural hop below `parent` on the way to `self`
    ///
    /// The result is `parent` plus the next container Rdn and its keys.
    /// `None` unless `self` is a strict descendant of `parent`.
    pub fn next_child_id(&self, parent: &ModelNodeId) -> Option<ModelNodeId> {
        if !self.begins_with(parent) || self.rdns.len() == parent.rdns.len() {
            return None;
        }
        let start = parent.rdns.len();
        let mut end = start + 1;
        while end < self.rdns.len() && !self.rdns[end].is_container() {
            end += 1;
        }
        Some(Self::from_rdns(self.rdns[..end].to_vec()))
    }
}

struct EntryBlock<'a> {
    container: Option<&'a Rdn>,
    keys: Vec<&'a Rdn>,
}

fn key_predicate(name: &str, value: &str) -> String {
    if value.contains('\'') {
        format!("[{}=\"{}\"]", name, value)
    } else {
        format!("[{}='{}']", name, value)
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '\\' | '/' | '=') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split on unescaped `sep`, keeping escapes in the pieces
fn split_unescaped(s: &str, sep: char) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in s.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            current.push(ch);
            escaped = true;
        } else if ch == sep {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    if escaped {
        return Err(NetconfError::MalformedNodeId {
            segment: current,
            reason: "dangling escape".to_string(),
        });
    }
    parts.push(current);
    Ok(parts)
}

fn cmp_rdn(a: &Rdn, b: &Rdn) -> Ordering {
    a.name()
        .cmp(b.name())
        .then_with(|| a.namespace().cmp(b.namespace()))
        .then_with(|| natural_cmp(a.value(), b.value()))
}

impl PartialEq for ModelNodeId {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for ModelNodeId {}

impl Hash for ModelNodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rdns.hash(state);
    }
}

impl Ord for ModelNodeId {
    /// Rdn by Rdn with natural value ordering; a prefix sorts first
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.rdns.iter().zip(other.rdns.iter()) {
            let ord = cmp_rdn(a, b);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.rdns.len().cmp(&other.rdns.len())
    }
}

impl PartialOrd for ModelNodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ModelNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelNodeId({})", self.path_string())
    }
}

impl fmt::Display for ModelNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:example:jukebox";

    fn album_id() -> ModelNodeId {
        ModelNodeId::from_rdns(vec![
            Rdn::container(NS, "jukebox"),
            Rdn::container(NS, "library"),
            Rdn::container(NS, "artist"),
            Rdn::key(NS, "name", "Lenny"),
            Rdn::container(NS, "album"),
            Rdn::key(NS, "name", "Circus"),
        ])
    }

    #[test]
    fn test_path_string_round_trip() {
        let id = album_id();
        let parsed = ModelNodeId::from_path_string(id.path_string(), NS).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_escaped_values_round_trip() {
        let id = ModelNodeId::new()
            .with_rdn(Rdn::container(NS, "interface"))
            .with_rdn(Rdn::key(NS, "name", "eth0/1=a\\b"));
        let parsed = ModelNodeId::from_path_string(id.path_string(), NS).unwrap();
        assert_eq!(parsed.rdns()[1].value(), "eth0/1=a\\b");
    }

    #[test]
    fn test_parse_error_names_segment() {
        let err = ModelNodeId::from_path_string("/container=a/broken", NS).unwrap_err();
        match err {
            NetconfError::MalformedNodeId { segment, .. } => assert_eq!(segment, "broken"),
            other => panic!("unexpected error {other:?}"),
        }
        match ModelNodeId::from_path_string("//x=1", NS).unwrap_err() {
            NetconfError::MalformedNodeId { segment, reason } => {
                assert_eq!(segment, "");
                assert_eq!(reason, "empty segment at position 1");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(ModelNodeId::from_path_string("/=x", NS).is_err());
        assert!(ModelNodeId::from_path_string("/container=a\\", NS).is_err());
    }

    #[test]
    fn test_xpath_string() {
        assert_eq!(
            album_id().xpath_string(),
            "/jukebox/library/artist[name='Lenny']/album[name='Circus']"
        );
        assert_eq!(ModelNodeId::new().xpath_string(), "/");
    }

    #[test]
    fn test_cache_invalidated_on_mutation() {
        let mut id = album_id();
        let before = id.xpath_string().to_string();
        id.add_rdn(Rdn::container(NS, "song"));
        assert_ne!(id.xpath_string(), before);
        id.remove_first(2);
        assert_eq!(id.xpath_string(), "/artist[name='Lenny']/album[name='Circus']/song");
        assert_eq!(id.path_string().matches('/').count(), 5);
    }

    #[test]
    fn test_parent_and_depth() {
        let id = album_id();
        assert_eq!(id.depth(), 4);
        let parent = id.parent_id().unwrap();
        assert_eq!(parent.xpath_string(), "/jukebox/library/artist[name='Lenny']");
        assert_eq!(
            ModelNodeId::new()
                .with_rdn(Rdn::container(NS, "jukebox"))
                .parent_id(),
            Some(ModelNodeId::new())
        );
        assert_eq!(ModelNodeId::new().parent_id(), None);
    }

    #[test]
    fn test_begins_with_and_templates() {
        let id = album_id();
        let artist = id.parent_id().unwrap();
        assert!(id.begins_with(&artist));
        assert!(!artist.begins_with(&id));

        let other_artist = ModelNodeId::from_rdns(vec![
            Rdn::container(NS, "jukebox"),
            Rdn::container(NS, "library"),
            Rdn::container(NS, "artist"),
            Rdn::key(NS, "name", "Prince"),
        ]);
        assert!(!id.begins_with(&other_artist));
        assert!(id.begins_with_template(&other_artist));
    }

    #[test]
    fn test_template_ignoring_key_order() {
        let id = ModelNodeId::from_rdns(vec![
            Rdn::container(NS, "route"),
            Rdn::key(NS, "prefix", "10.0.0.0"),
            Rdn::key(NS, "metric", "5"),
        ]);
        let swapped = ModelNodeId::from_rdns(vec![
            Rdn::container(NS, "route"),
            Rdn::key(NS, "metric", "7"),
            Rdn::key(NS, "prefix", "192.168.0.0"),
        ]);
        assert!(!id.begins_with_template(&swapped));
        assert!(id.begins_with_template_ignore_key_order(&swapped));
    }

    #[test]
    fn test_next_child_id() {
        let id = album_id();
        let library = ModelNodeId::from_rdns(id.rdns()[..2].to_vec());
        let child = id.next_child_id(&library).unwrap();
        assert_eq!(child.xpath_string(), "/jukebox/library/artist[name='Lenny']");
        assert_eq!(id.next_child_id(&id), None);
    }

    #[test]
    fn test_natural_ordering_and_prefix() {
        let a2 = ModelNodeId::new()
            .with_rdn(Rdn::container(NS, "port"))
            .with_rdn(Rdn::key(NS, "id", "2"));
        let a10 = ModelNodeId::new()
            .with_rdn(Rdn::container(NS, "port"))
            .with_rdn(Rdn::key(NS, "id", "10"));
        assert!(a2 < a10);

        let parent = a2.parent_id().unwrap();
        assert!(parent < a2);
    }
}
