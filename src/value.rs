//! Row identities and sortable cell values.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// String-coerced identity of a row.
///
/// Expansion, selection and active-item state all address rows by this key,
/// so numeric ids are converted to their decimal string form on the way in.
///
/// ```rust
/// use table_controls::ItemId;
///
/// assert_eq!(ItemId::from(42u32), ItemId::from("42"));
/// assert_eq!(ItemId::from("app-a").as_str(), "app-a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for ItemId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

macro_rules! item_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ItemId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

item_id_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// A value a column contributes to sorting.
///
/// Callers map each item to one of these per sortable column; the comparator
/// matches on the variants instead of inspecting runtime types.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Text, compared after removing whitespace with a locale-style collation.
    String(String),
    /// Numbers, compared by subtraction.
    Number(f64),
    /// Flags, `false` before `true`.
    Bool(bool),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Number(_) => 1,
            SortValue::String(_) => 2,
        }
    }

    /// Total order used when the two values cannot be compared by the
    /// string or number rules: booleans by value, otherwise by variant.
    pub(crate) fn fallback_cmp(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::String(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::String(value)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Number(value)
    }
}

macro_rules! sort_value_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SortValue {
                fn from(value: $t) -> Self {
                    SortValue::Number(value as f64)
                }
            }
        )*
    };
}

sort_value_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32);

/// Removes every whitespace character from `value`.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Letters with diacritics removed and case folded.
fn primary_key(value: &str) -> impl Iterator<Item = char> + '_ {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Letters and diacritics, case folded.
fn secondary_key(value: &str) -> impl Iterator<Item = char> + '_ {
    value.nfd().flat_map(char::to_lowercase)
}

/// Collation-style string comparison.
///
/// Three levels, each consulted only when the previous one is equal:
/// base letters ignoring accents and case ("é" sorts with "e", before "f"),
/// then accents ("e" < "é"), then case with lowercase ordered before
/// uppercase ("a" < "A" < "b"). This matches the default root-locale
/// ordering for Latin text.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let primary = primary_key(a).cmp(primary_key(b));
    if primary != Ordering::Equal {
        return primary;
    }
    let secondary = secondary_key(a).cmp(secondary_key(b));
    if secondary != Ordering::Equal {
        return secondary;
    }

    for (ca, cb) in a.nfd().zip(b.nfd()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_coerces_numbers() {
        assert_eq!(ItemId::from(7usize).as_str(), "7");
        assert_eq!(ItemId::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn test_locale_compare_is_case_insensitive_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Banana", "apple"), Ordering::Greater);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("A", "b"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_locale_compare_ignores_accents_first() {
        assert_eq!(locale_compare("é", "f"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Frank"), Ordering::Less);
        assert_eq!(locale_compare("zoë", "zoo"), Ordering::Less);
        assert_eq!(locale_compare("e", "é"), Ordering::Less);
        assert_eq!(locale_compare("resume", "résumé"), Ordering::Less);
        assert_eq!(locale_compare("é", "É"), Ordering::Less);
        // Precomposed and decomposed forms collate as equal.
        assert_eq!(locale_compare("\u{e9}", "e\u{301}"), Ordering::Equal);
    }

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace(" app  one\t"), "appone");
    }

    #[test]
    fn test_fallback_order() {
        assert_eq!(
            SortValue::Bool(false).fallback_cmp(&SortValue::Bool(true)),
            Ordering::Less
        );
        assert_eq!(
            SortValue::Number(1.0).fallback_cmp(&SortValue::from("x")),
            Ordering::Less
        );
    }
}
