// Materialized item table with a live search filter
// Filtering only hides/shows rows that are already loaded - it never re-queries.

use crate::query::Item;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: &'static str,
    pub hidden: bool,
    pub emphasized: bool,
}

pub const COLUMNS: [Column; 6] = [
    Column {
        name: "BookID",
        hidden: true,
        emphasized: false,
    },
    Column {
        name: "Title",
        hidden: false,
        emphasized: true,
    },
    Column {
        name: "Collection",
        hidden: false,
        emphasized: false,
    },
    Column {
        name: "Author",
        hidden: false,
        emphasized: false,
    },
    Column {
        name: "Path",
        hidden: true,
        emphasized: false,
    },
    Column {
        name: "Tags",
        hidden: false,
        emphasized: false,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<Item>,
    shown: Vec<bool>,
    filter: String,
}

impl ResultTable {
    pub fn new(rows: Vec<Item>) -> Self {
        let shown = vec![true; rows.len()];
        Self {
            rows,
            shown,
            filter: String::new(),
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        &COLUMNS
    }

    /// Text of one cell, hidden columns included.
    pub fn cell(item: &Item, column: usize) -> Option<String> {
        let text = match column {
            0 => item.id.to_string(),
            1 => item.title.clone(),
            2 => item.collection.clone(),
            3 => item.author.clone(),
            4 => item.path.clone(),
            5 => item.tags.clone(),
            _ => return None,
        };
        Some(text)
    }

    /// Show only rows where some visible column contains `filter`, ignoring case. Empty shows everything.
    pub fn apply_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        let needle = filter.to_lowercase();
        for (row, shown) in self.rows.iter().zip(self.shown.iter_mut()) {
            *shown = needle.is_empty()
                || COLUMNS
                    .iter()
                    .enumerate()
                    .filter(|(_, column)| !column.hidden)
                    .filter_map(|(index, _)| Self::cell(row, index))
                    .any(|text| text.to_lowercase().contains(&needle));
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn row(&self, index: usize) -> Option<&Item> {
        self.rows.get(index)
    }

    pub fn is_shown(&self, index: usize) -> bool {
        self.shown.get(index).copied().unwrap_or(false)
    }

    /// Shown rows with their index in the full table.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, _)| self.shown[*index])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
