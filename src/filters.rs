// Filter predicates - the few most used ordinary tags, each one toggleable
// Read once when the library opens. Enabled predicates are ANDed into the item query.
// "All" and "None" are aggregate switches and never end up on together.

use crate::error::StoreResult;
use crate::store::{starts_with_pattern, StoreSession};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Literal tag name an item must also carry when enabled.
    pub name: String,
    pub count: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicateSet {
    predicates: Vec<FilterPredicate>,
    all: bool,
    none: bool,
}

impl Default for FilterPredicateSet {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
            all: false,
            none: true,
        }
    }
}

impl FilterPredicateSet {
    /// Most used tags first, skipping the music marker and playlist tags. Anything past `capacity` is dropped.
    pub fn discover(
        session: &StoreSession,
        music_tag: &str,
        list_prefix: &str,
        capacity: usize,
    ) -> StoreResult<Self> {
        let rows: Vec<(String, i64)> = session.query(
            "SELECT t.name, count(1) AS uses FROM tags t
             INNER JOIN books_tags_link btl ON btl.tag = t.id
             WHERE t.name <> ?1 AND t.name NOT LIKE ?2 ESCAPE '\\'
             GROUP BY t.name
             ORDER BY uses DESC, t.name
             LIMIT ?3",
            params![music_tag, starts_with_pattern(list_prefix), capacity as i64],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        for (name, count) in &rows {
            debug!("Filter tag '{}' used {} times", name, count);
        }
        Ok(Self::from_counts(rows, capacity))
    }

    pub fn from_counts<I>(counts: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = (String, i64)>,
    {
        let predicates = counts
            .into_iter()
            .take(capacity)
            .map(|(name, count)| FilterPredicate {
                name,
                count,
                enabled: false,
            })
            .collect();
        Self {
            predicates,
            ..Self::default()
        }
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn all_checked(&self) -> bool {
        self.all
    }

    pub fn none_checked(&self) -> bool {
        self.none
    }

    /// Names of the enabled predicates, in discovery order.
    pub fn enabled_names(&self) -> Vec<&str> {
        self.predicates
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Switch one predicate. Returns false for an index outside the set.
    pub fn toggle(&mut self, index: usize, on: bool) -> bool {
        let Some(predicate) = self.predicates.get_mut(index) else {
            return false;
        };
        predicate.enabled = on;
        if on {
            self.none = false;
        } else {
            self.all = false;
        }
        true
    }

    pub fn toggle_by_name(&mut self, name: &str, on: bool) -> bool {
        match self.predicates.iter().position(|p| p.name == name) {
            Some(index) => self.toggle(index, on),
            None => false,
        }
    }

    pub fn set_all(&mut self, on: bool) {
        self.all = on;
        if on {
            self.none = false;
            self.predicates.iter_mut().for_each(|p| p.enabled = true);
        }
    }

    pub fn set_none(&mut self, on: bool) {
        self.none = on;
        if on {
            self.all = false;
            self.predicates.iter_mut().for_each(|p| p.enabled = false);
        }
    }
}
