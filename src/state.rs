use std::collections::HashSet;

pub const MAX_RECENT_SEARCHES: usize = 5;

/// Concert ids the user marked as attending, in toggle order.
#[derive(Debug, Clone, Default)]
pub struct AttendanceSet {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl AttendanceSet {
    /// Builds the set from a persisted list, dropping repeated ids.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut set = Self::default();
        for id in ids {
            if set.index.insert(id.clone()) {
                set.ids.push(id);
            }
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Removes `id` if present, appends it otherwise. Returns the new membership.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.index.remove(id) {
            self.ids.retain(|existing| existing != id);
            false
        } else {
            self.index.insert(id.to_string());
            self.ids.push(id.to_string());
            true
        }
    }
}

/// Most-recent-first city searches, bounded to [`MAX_RECENT_SEARCHES`].
#[derive(Debug, Clone, Default)]
pub struct RecentSearches {
    cities: Vec<String>,
}

impl RecentSearches {
    pub fn from_cities(cities: Vec<String>) -> Self {
        let mut recent = Self::default();
        // Persisted order is most-recent-first, so replay oldest first.
        for city in cities.into_iter().rev() {
            recent.record(&city);
        }
        recent
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    /// Moves `city` to the front. Empty input is ignored; returns whether anything changed.
    pub fn record(&mut self, city: &str) -> bool {
        let city = city.trim();
        if city.is_empty() {
            return false;
        }
        self.cities.retain(|existing| existing != city);
        self.cities.insert(0, city.to_string());
        self.cities.truncate(MAX_RECENT_SEARCHES);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_original_content() {
        let mut set = AttendanceSet::from_ids(vec!["a".into(), "b".into()]);
        assert!(set.toggle("c"));
        assert!(set.contains("c"));
        assert_eq!(set.len(), 3);
        assert!(!set.toggle("c"));
        assert!(!set.contains("c"));
        assert_eq!(set.ids(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut set = AttendanceSet::default();
        set.toggle("x");
        set.toggle("y");
        set.toggle("z");
        set.toggle("y");
        set.toggle("y");
        assert_eq!(set.ids(), ["x".to_string(), "z".to_string(), "y".to_string()]);
    }

    #[test]
    fn from_ids_drops_duplicates() {
        let set = AttendanceSet::from_ids(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(set.ids(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn recent_searches_are_bounded_and_most_recent_first() {
        let mut recent = RecentSearches::default();
        for city in ["Córdoba", "Rosario", "Mendoza", "Salta", "La Plata", "Tucumán"] {
            recent.record(city);
        }
        assert_eq!(recent.cities().len(), MAX_RECENT_SEARCHES);
        assert_eq!(recent.cities()[0], "Tucumán");
        assert!(!recent.cities().contains(&"Córdoba".to_string()));
    }

    #[test]
    fn re_recording_moves_city_to_front_without_duplicates() {
        let mut recent = RecentSearches::default();
        recent.record("Rosario");
        recent.record("Mendoza");
        recent.record("Rosario");
        assert_eq!(recent.cities(), ["Rosario".to_string(), "Mendoza".to_string()]);
    }

    #[test]
    fn empty_city_is_ignored() {
        let mut recent = RecentSearches::default();
        assert!(!recent.record(""));
        assert!(!recent.record("   "));
        assert!(recent.cities().is_empty());
    }

    #[test]
    fn from_cities_preserves_persisted_order() {
        let recent = RecentSearches::from_cities(vec![
            "Salta".into(),
            "Rosario".into(),
            "Salta".into(),
        ]);
        assert_eq!(recent.cities(), ["Salta".to_string(), "Rosario".to_string()]);
    }
}
