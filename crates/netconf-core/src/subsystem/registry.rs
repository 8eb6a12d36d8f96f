use std::fmt;
use std::sync::Arc;

use super::SubSystem;
use crate::model::SchemaPath;

/// Schema location to subsystem mapping
///
/// Lookup picks the registration with the longest schema path that is an
/// ancestor-or-self of the queried path.
#[derive(Clone, Default)]
pub struct SubSystemRegistry {
    entries: Vec<(SchemaPath, Arc<dyn SubSystem>)>,
}

impl SubSystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subsystem` for `path`, replacing any previous owner
    pub fn register(&mut self, path: SchemaPath, subsystem: Arc<dyn SubSystem>) {
        self.entries.retain(|(p, _)| *p != path);
        self.entries.push((path, subsystem));
    }

    pub fn unregister(&mut self, path: &SchemaPath) -> Option<Arc<dyn SubSystem>> {
        let pos = self.entries.iter().position(|(p, _)| p == path)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn lookup(&self, path: &SchemaPath) -> Option<Arc<dyn SubSystem>> {
        self.entries
            .iter()
            .filter(|(p, _)| path.begins_with(p))
            .max_by_key(|(p, _)| p.len())
            .map(|(_, s)| Arc::clone(s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for SubSystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(p, s)| (p.to_string(), s.id().to_string())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QName;

    struct Named(&'static str);

    impl SubSystem for Named {
        fn id(&self) -> &str {
            self.0
        }
    }

    const NS: &str = "urn:example:jukebox";

    #[test]
    fn test_longest_prefix_wins() {
        let jukebox = SchemaPath::root().child(QName::new(NS, "jukebox"));
        let player = jukebox.child(QName::new(NS, "player"));

        let mut registry = SubSystemRegistry::new();
        registry.register(jukebox.clone(), Arc::new(Named("library")));
        registry.register(player.clone(), Arc::new(Named("player")));

        let gap = player.child(QName::new(NS, "gap"));
        assert_eq!(registry.lookup(&gap).unwrap().id(), "player");
        let artist = jukebox.child(QName::new(NS, "library"));
        assert_eq!(registry.lookup(&artist).unwrap().id(), "library");
        assert!(registry.lookup(&SchemaPath::root()).is_none());
    }

    #[test]
    fn test_unregister() {
        let path = SchemaPath::root().child(QName::new(NS, "jukebox"));
        let mut registry = SubSystemRegistry::new();
        registry.register(path.clone(), Arc::new(Named("library")));
        assert!(registry.unregister(&path).is_some());
        assert!(registry.lookup(&path).is_none());
    }
}
