// Playlist tag names: <prefix><label>|<NN>
// Every tag in the reserved prefix namespace is one "add event" of a label;
// the zero-padded ordinal keeps lexical order equal to numeric order.

use crate::error::{MutationError, MutationResult};
use serde::{Deserialize, Serialize};

pub const DELIMITER: char = '|';
pub const ORDINAL_WIDTH: usize = 2;
pub const MAX_ORDINAL: u32 = 99;

/// A decoded playlist tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTag {
    pub label: String,
    /// `None` for bare `<prefix><label>` tags or a non-numeric suffix.
    pub ordinal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCodec {
    prefix: String,
}

impl PlaylistCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn encode(&self, label: &str, ordinal: u32) -> String {
        format!(
            "{}{}{}{:0width$}",
            self.prefix,
            label,
            DELIMITER,
            ordinal,
            width = ORDINAL_WIDTH
        )
    }

    pub fn decode(&self, name: &str) -> Option<PlaylistTag> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        match rest.split_once(DELIMITER) {
            Some((label, suffix)) => Some(PlaylistTag {
                label: label.to_string(),
                ordinal: parse_ordinal(suffix),
            }),
            None => Some(PlaylistTag {
                label: rest.to_string(),
                ordinal: None,
            }),
        }
    }

    pub fn is_playlist_tag(&self, name: &str) -> bool {
        name.starts_with(self.prefix.as_str())
    }

    /// True when `name` belongs to the playlist called `label`.
    /// Labels compare ASCII case-insensitively, like calibre's NOCASE tag names.
    pub fn belongs_to(&self, name: &str, label: &str) -> bool {
        self.decode(name)
            .is_some_and(|tag| tag.label.eq_ignore_ascii_case(label))
    }

    /// `<prefix><label>` - a bare tag of the label, no ordinal.
    pub fn bare_name(&self, label: &str) -> String {
        format!("{}{}", self.prefix, label)
    }

    /// `<prefix><label>|` - every ordinal of the label starts with this.
    pub fn ordinal_stem(&self, label: &str) -> String {
        format!("{}{}{}", self.prefix, label, DELIMITER)
    }

    /// Ordinal following `current`, bounded by the two-digit width.
    pub fn next_ordinal(&self, label: &str, current: u32) -> MutationResult<u32> {
        if current >= MAX_ORDINAL {
            return Err(MutationError::OrdinalsExhausted {
                label: label.to_string(),
                max: MAX_ORDINAL,
            });
        }
        Ok(current + 1)
    }
}

pub fn validate_label(label: &str) -> MutationResult<()> {
    if label.trim().is_empty() || label.contains(DELIMITER) {
        return Err(MutationError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

fn parse_ordinal(suffix: &str) -> Option<u32> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
