use std::sync::Arc;

use tracing::debug;

use crate::adapters::SiteAdapter;
use crate::model::{Query, Script};

/// True for code points in the Cyrillic block (U+0400..=U+04FF).
pub fn is_cyrillic(c: char) -> bool {
    ('\u{0400}'..='\u{04FF}').contains(&c)
}

/// A single Cyrillic character makes the whole query Cyrillic.
pub fn classify_script(text: &str) -> Script {
    if text.chars().any(is_cyrillic) {
        Script::Cyrillic
    } else {
        Script::Other
    }
}

/// Picks the adapters that should see a query.
///
/// Adapters keep their registration order, which doubles as priority.
#[derive(Clone, Default)]
pub struct Router {
    adapters: Vec<Arc<dyn SiteAdapter>>,
}

impl Router {
    pub fn new(adapters: Vec<Arc<dyn SiteAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn register(&mut self, adapter: Arc<dyn SiteAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Arc<dyn SiteAdapter>] {
        &self.adapters
    }

    /// Adapters whose family matches the query script, in priority order.
    pub fn route(&self, query: &Query) -> Vec<Arc<dyn SiteAdapter>> {
        let family = query.script();
        let routed: Vec<_> = self
            .adapters
            .iter()
            .filter(|a| a.family() == family)
            .cloned()
            .collect();
        debug!(
            target: "chords.router",
            query = %query.raw(),
            script = ?family,
            adapters = ?routed.iter().map(|a| a.name()).collect::<Vec<_>>(),
            "chords.route"
        );
        routed
    }

    /// The adapter responsible for `url`, if any.
    pub fn adapter_for(&self, url: &url::Url) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters.iter().find(|a| a.handles(url)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cyrillic_letter_flips_script() {
        assert_eq!(classify_script("Wonderwall"), Script::Other);
        assert_eq!(classify_script("Кино"), Script::Cyrillic);
        assert_eq!(classify_script("Kino группа"), Script::Cyrillic);
        assert_eq!(classify_script("Ёлка"), Script::Cyrillic);
        assert_eq!(classify_script("Café 123"), Script::Other);
    }

    #[test]
    fn block_bounds_are_inclusive() {
        assert!(is_cyrillic('\u{0400}'));
        assert!(is_cyrillic('\u{04FF}'));
        assert!(!is_cyrillic('\u{0500}'));
        assert!(!is_cyrillic('\u{03FF}'));
    }
}
