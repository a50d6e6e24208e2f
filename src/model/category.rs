use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// The category used when none is given.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// A spending category such as `Food` or `Eating Out`.
///
/// Categories are normalized when they are created: surrounding whitespace is trimmed, every
/// word is title-cased and an empty name becomes `Misc`. Two categories are equal when their
/// normalized names are equal.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl AsRef<str>) -> Self {
        let normalized = title_case(name.as_ref().trim());
        if normalized.is_empty() {
            Self(DEFAULT_CATEGORY.to_string())
        } else {
            Self(normalized)
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns true if `fragment` occurs anywhere in the name, ignoring case.
    pub fn contains(&self, fragment: &str) -> bool {
        self.0
            .to_lowercase()
            .contains(&fragment.trim().to_lowercase())
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY.to_string())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Category::new(value)
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::new(value)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Category::new(s))
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest. A word starts after any
/// character that is not alphabetic, so `o'neil` becomes `O'Neil`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
