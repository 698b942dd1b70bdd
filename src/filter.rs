//! Filter categories, filter state and local (in-memory) filtering.
//!
//! A table exposes one [`FilterCategory`] per filterable dimension. The
//! active values for each category live in a [`FilterState`], and
//! [`filter_items`] applies them to a list of items:
//!
//! - categories combine with AND: an item must satisfy every active category
//! - values inside one category combine with OR, unless the category is
//!   configured with [`LogicOperator::And`]
//! - a value matches when it is a case-insensitive substring of the item's
//!   value for that category (or a fuzzy match for [`MatchMode::Fuzzy`])
//! - an item with no value for a category never matches that category
//!
//! Filtering never reorders items.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Active filter values keyed by category key.
pub type FilterValues = BTreeMap<String, Vec<String>>;

/// Extracts the filterable value of an item for one category.
pub type ItemValueFn<T> = Box<dyn Fn(&T) -> Option<String>>;

/// Maps the active values of a category to the values sent to the hub.
pub type ServerValueFn = Box<dyn Fn(&[String]) -> Vec<String>>;

/// The kind of control a filter category is driven by.
///
/// The kind matters for remote filtering, where it decides the hub operator
/// and whether one value or a list is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// Free-text search; remote filters use the `~` (like) operator.
    #[default]
    Search,
    /// A single choice out of a fixed set.
    Select,
    /// Any number of choices out of a fixed set.
    #[serde(rename = "multiselect")]
    MultiSelect,
    /// A numeric search box.
    #[serde(rename = "numsearch")]
    NumSearch,
}

/// How several values are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    /// Every value must match.
    And,
    /// At least one value must match.
    #[default]
    Or,
}

/// How a single filter value is tested against an item value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Skim-style fuzzy match, as used by interactive list filtering.
    Fuzzy,
}

/// One filterable dimension of a table.
///
/// # Examples
///
/// ```rust
/// use table_controls::filter::{FilterCategory, FilterType, LogicOperator};
///
/// struct App {
///     name: String,
///     tags: Vec<String>,
/// }
///
/// let name = FilterCategory::<App>::new("name", "Name")
///     .with_item_value(|app| Some(app.name.clone()));
///
/// let tags = FilterCategory::<App>::new("tag", "Tags")
///     .with_type(FilterType::MultiSelect)
///     .with_logic_operator(LogicOperator::And)
///     .with_item_value(|app| Some(app.tags.join(" ")))
///     .with_server_field("tag.name");
///
/// assert_eq!(tags.server_field(), "tag.name");
/// assert_eq!(name.server_field(), "name");
/// ```
pub struct FilterCategory<T> {
    /// Key the active values are stored under.
    pub key: String,
    /// Human readable name of the category.
    pub title: String,
    /// Control kind.
    pub filter_type: FilterType,
    /// How multiple active values combine.
    pub logic_operator: LogicOperator,
    /// How a single value is matched locally.
    pub match_mode: MatchMode,
    /// Optional placeholder text for the filter control.
    pub placeholder: Option<String>,
    server_field: Option<String>,
    get_item_value: Option<ItemValueFn<T>>,
    get_server_value: Option<ServerValueFn>,
}

impl<T> fmt::Debug for FilterCategory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCategory")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("filter_type", &self.filter_type)
            .field("logic_operator", &self.logic_operator)
            .field("match_mode", &self.match_mode)
            .field("server_field", &self.server_field)
            .finish_non_exhaustive()
    }
}

impl<T> FilterCategory<T> {
    /// Creates a search category with OR logic and substring matching.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            filter_type: FilterType::default(),
            logic_operator: LogicOperator::default(),
            match_mode: MatchMode::default(),
            placeholder: None,
            server_field: None,
            get_item_value: None,
            get_server_value: None,
        }
    }

    /// Sets the control kind.
    pub fn with_type(mut self, filter_type: FilterType) -> Self {
        self.filter_type = filter_type;
        self
    }

    /// Sets how several active values combine.
    pub fn with_logic_operator(mut self, operator: LogicOperator) -> Self {
        self.logic_operator = operator;
        self
    }

    /// Switches local matching to fuzzy matching.
    pub fn fuzzy(mut self) -> Self {
        self.match_mode = MatchMode::Fuzzy;
        self
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the accessor used to read an item's value for this category.
    pub fn with_item_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<String> + 'static,
    {
        self.get_item_value = Some(Box::new(f));
        self
    }

    /// Sets the field name the hub knows this category by.
    pub fn with_server_field(mut self, field: impl Into<String>) -> Self {
        self.server_field = Some(field.into());
        self
    }

    /// Sets a mapping from active values to the values sent to the hub.
    pub fn with_server_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) -> Vec<String> + 'static,
    {
        self.get_server_value = Some(Box::new(f));
        self
    }

    /// Field name used in hub filters; falls back to the category key.
    pub fn server_field(&self) -> &str {
        self.server_field.as_deref().unwrap_or(&self.key)
    }

    /// Values sent to the hub for the given active values.
    pub fn server_values(&self, values: &[String]) -> Vec<String> {
        match &self.get_server_value {
            Some(f) => {
                let mapped = f(values);
                if mapped.is_empty() {
                    values.to_vec()
                } else {
                    mapped
                }
            }
            None => values.to_vec(),
        }
    }

    /// Resolves an item's value for this category.
    pub fn item_value(&self, item: &T) -> Option<String> {
        self.get_item_value.as_ref().and_then(|f| f(item))
    }

    /// Tests an item against the given active values of this category.
    pub fn matches(&self, item: &T, values: &[String]) -> bool {
        self.matches_with(&SkimMatcherV2::default(), item, values)
    }

    fn matches_with(&self, matcher: &SkimMatcherV2, item: &T, values: &[String]) -> bool {
        if values.is_empty() {
            return true;
        }
        let item_value = match self.item_value(item) {
            Some(value) if !value.is_empty() => value,
            _ => return false,
        };
        let lowered = item_value.to_lowercase();
        let test = |filter_value: &String| match self.match_mode {
            MatchMode::Substring => lowered.contains(&filter_value.to_lowercase()),
            MatchMode::Fuzzy => matcher.fuzzy_match(&item_value, filter_value).is_some(),
        };
        match self.logic_operator {
            LogicOperator::Or => values.iter().any(test),
            LogicOperator::And => values.iter().all(test),
        }
    }
}

/// Active filter values of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    filter_values: FilterValues,
}

impl FilterState {
    /// Creates a state with no active filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state with initial values (builder pattern).
    pub fn with_filter_values(mut self, values: FilterValues) -> Self {
        self.filter_values = values
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .collect();
        self
    }

    /// Returns all active values.
    pub fn filter_values(&self) -> &FilterValues {
        &self.filter_values
    }

    /// Returns the active values for one category (empty when none).
    pub fn values_for(&self, key: &str) -> &[String] {
        self.filter_values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replaces the active values of one category.
    ///
    /// Passing no values removes the category. Returns `true` if anything
    /// changed.
    pub fn set_filter_values(&mut self, key: impl Into<String>, values: Vec<String>) -> bool {
        let key = key.into();
        if values.is_empty() {
            return self.filter_values.remove(&key).is_some();
        }
        if self.filter_values.get(&key) == Some(&values) {
            return false;
        }
        self.filter_values.insert(key, values);
        true
    }

    /// Removes one value from a category, dropping the category if it
    /// becomes empty.
    pub fn remove_value(&mut self, key: &str, value: &str) -> bool {
        let Some(values) = self.filter_values.get_mut(key) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        let changed = values.len() != before;
        if values.is_empty() {
            self.filter_values.remove(key);
        }
        changed
    }

    /// Clears every active filter.
    pub fn clear_all(&mut self) {
        self.filter_values.clear();
    }

    /// Returns true if any category has active values.
    pub fn has_active_filters(&self) -> bool {
        self.filter_values.values().any(|v| !v.is_empty())
    }
}

/// Keeps the items that satisfy every active filter category.
///
/// Keys in `values` with no matching category impose no constraint.
///
/// # Examples
///
/// ```rust
/// use table_controls::filter::{filter_items, FilterCategory, FilterValues};
///
/// let categories = vec![FilterCategory::<&str>::new("name", "Name")
///     .with_item_value(|s| Some(s.to_string()))];
///
/// let items = vec!["alpha", "beta", "Alphabet"];
/// let mut values = FilterValues::new();
/// values.insert("name".into(), vec!["ALPHA".into()]);
///
/// let filtered = filter_items(&items, &categories, &values);
/// assert_eq!(filtered, vec![&"alpha", &"Alphabet"]);
/// ```
pub fn filter_items<'a, T, I>(
    items: I,
    categories: &[FilterCategory<T>],
    values: &FilterValues,
) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    let active: Vec<(&FilterCategory<T>, &[String])> = values
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .filter_map(|(key, v)| match categories.iter().find(|c| &c.key == key) {
            Some(category) => Some((category, v.as_slice())),
            None => {
                log::trace!("ignoring filter values for unknown category `{key}`");
                None
            }
        })
        .collect();

    if active.is_empty() {
        return items.into_iter().collect();
    }

    let matcher = SkimMatcherV2::default();
    items
        .into_iter()
        .filter(|item| {
            active
                .iter()
                .all(|(category, v)| category.matches_with(&matcher, item, v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct App {
        id: u32,
        name: &'static str,
        tag: Option<&'static str>,
        owner: &'static str,
    }

    fn app(id: u32, name: &'static str, tag: Option<&'static str>, owner: &'static str) -> App {
        App {
            id,
            name,
            tag,
            owner,
        }
    }

    fn apps() -> Vec<App> {
        vec![
            app(1, "Billing", Some("a"), "x"),
            app(2, "Inventory", Some("b"), "y"),
            app(3, "Shipping", Some("c"), "x"),
            app(4, "Orders", None, "x"),
            app(5, "Payments", Some("a"), "y"),
        ]
    }

    fn categories() -> Vec<FilterCategory<App>> {
        vec![
            FilterCategory::new("name", "Name").with_item_value(|a: &App| Some(a.name.to_string())),
            FilterCategory::new("tag", "Tag")
                .with_type(FilterType::MultiSelect)
                .with_item_value(|a: &App| a.tag.map(str::to_string)),
            FilterCategory::new("owner", "Owner")
                .with_item_value(|a: &App| Some(a.owner.to_string())),
        ]
    }

    fn values(entries: &[(&str, &[&str])]) -> FilterValues {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn ids(items: &[&App]) -> Vec<u32> {
        items.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_or_within_category() {
        let items = apps();
        let filtered = filter_items(&items, &categories(), &values(&[("tag", &["a", "b"])]));
        assert_eq!(ids(&filtered), vec![1, 2, 5]);
    }

    #[test]
    fn test_and_across_categories() {
        let items = apps();
        let filtered = filter_items(
            &items,
            &categories(),
            &values(&[("tag", &["a"]), ("owner", &["x"])]),
        );
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn test_and_within_category_when_configured() {
        let categories = vec![FilterCategory::new("name", "Name")
            .with_logic_operator(LogicOperator::And)
            .with_item_value(|a: &App| Some(a.name.to_string()))];
        let items = apps();
        let filtered = filter_items(&items, &categories, &values(&[("name", &["pay", "ments"])]));
        assert_eq!(ids(&filtered), vec![5]);

        let filtered = filter_items(&items, &categories, &values(&[("name", &["pay", "bill"])]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_case_insensitive_substring() {
        let items = apps();
        let filtered = filter_items(&items, &categories(), &values(&[("name", &["PING"])]));
        assert_eq!(ids(&filtered), vec![3]);
    }

    #[test]
    fn test_missing_item_value_never_matches() {
        let items = apps();
        let filtered = filter_items(&items, &categories(), &values(&[("tag", &["a", "b", "c"])]));
        assert!(!ids(&filtered).contains(&4));
    }

    #[test]
    fn test_category_without_accessor_never_matches() {
        let categories = vec![FilterCategory::<App>::new("name", "Name")];
        let items = apps();
        assert!(filter_items(&items, &categories, &values(&[("name", &["a"])])).is_empty());
    }

    #[test]
    fn test_empty_values_impose_no_constraint() {
        let items = apps();
        let filtered = filter_items(&items, &categories(), &values(&[("tag", &[])]));
        assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let items = apps();
        let filtered = filter_items(&items, &categories(), &values(&[("nope", &["zzz"])]));
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = apps();
        let v = values(&[("tag", &["a", "c"]), ("owner", &["x"])]);
        let once = filter_items(&items, &categories(), &v);
        let twice = filter_items(once.iter().copied(), &categories(), &v);
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn test_fuzzy_matching() {
        let categories = vec![FilterCategory::new("name", "Name")
            .fuzzy()
            .with_item_value(|a: &App| Some(a.name.to_string()))];
        let items = apps();
        let filtered = filter_items(&items, &categories, &values(&[("name", &["invtry"])]));
        assert_eq!(ids(&filtered), vec![2]);
    }

    #[test]
    fn test_filter_state_values() {
        let mut state = FilterState::new();
        assert!(!state.has_active_filters());

        assert!(state.set_filter_values("tag", vec!["a".into(), "b".into()]));
        assert!(!state.set_filter_values("tag", vec!["a".into(), "b".into()]));
        assert_eq!(state.values_for("tag"), ["a".to_string(), "b".to_string()]);
        assert!(state.has_active_filters());

        assert!(state.remove_value("tag", "a"));
        assert_eq!(state.values_for("tag"), ["b".to_string()]);
        assert!(state.remove_value("tag", "b"));
        assert!(state.filter_values().is_empty());

        state.set_filter_values("name", vec!["x".into()]);
        assert!(state.set_filter_values("name", vec![]));
        assert!(!state.has_active_filters());
    }

    #[test]
    fn test_server_values_mapping() {
        let category = FilterCategory::<App>::new("risk", "Risk")
            .with_server_value(|values| values.iter().map(|v| v.to_uppercase()).collect());
        assert_eq!(
            category.server_values(&["low".into()]),
            vec!["LOW".to_string()]
        );
    }
}
