//! Hub query-string encoding and decoding.

use super::{FilterOperator, HubFilter, HubFilterValue, HubPage, HubRequestParams, HubSort};
use crate::error::ParseError;
use crate::filter::LogicOperator;
use crate::sort::SortDirection;
use url::form_urlencoded;

/// Ordered query parameters of a hub request.
///
/// Parameter order is preserved, and a key may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubQuery {
    pairs: Vec<(String, String)>,
}

impl HubQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All parameters in order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns true if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes the parameters as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Decodes an `application/x-www-form-urlencoded` string. A leading `?`
    /// is ignored.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
        }
    }
}

impl FromIterator<(String, String)> for HubQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Quotes a filter value, escaping every embedded `"` as `\"`.
pub fn wrap_in_quotes_and_escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Encodes one filter as `field<op>value`.
///
/// ```rust
/// use table_controls::filter::LogicOperator;
/// use table_controls::hub::{serialize_filter_for_hub, FilterOperator, HubFilter, HubFilterValue};
///
/// let filter = HubFilter::new("name", FilterOperator::Like, "app");
/// assert_eq!(serialize_filter_for_hub(&filter), r#"name~"app""#);
///
/// let tags = HubFilter::new(
///     "tag.id",
///     FilterOperator::Equal,
///     HubFilterValue::list(LogicOperator::Or, ["1", "2"]),
/// );
/// assert_eq!(serialize_filter_for_hub(&tags), r#"tag.id=("1"|"2")"#);
/// ```
pub fn serialize_filter_for_hub(filter: &HubFilter) -> String {
    let value = match &filter.value {
        HubFilterValue::String(s) => wrap_in_quotes_and_escape(s),
        HubFilterValue::Number(n) => format!("\"{n}\""),
        HubFilterValue::List { operator, list } => {
            let separator = match operator {
                LogicOperator::And => ",",
                LogicOperator::Or => "|",
            };
            let values: Vec<_> = list.iter().map(|v| wrap_in_quotes_and_escape(v)).collect();
            format!("({})", values.join(separator))
        }
    };
    format!("{}{}{}", filter.field, filter.operator, value)
}

/// Encodes request parameters as hub query parameters.
///
/// Filters with an empty value are dropped, and the `filter` parameter is
/// left out when no filter remains. `offset` is `(page - 1) * limit`.
///
/// ```rust
/// use table_controls::hub::{
///     serialize_request_params_for_hub, FilterOperator, HubFilter, HubPage, HubRequestParams, HubSort,
/// };
/// use table_controls::sort::SortDirection;
///
/// let params = HubRequestParams {
///     filters: Some(vec![HubFilter::new("name", FilterOperator::Equal, "app-a")]),
///     sort: Some(HubSort { field: "name".into(), direction: SortDirection::Asc }),
///     page: Some(HubPage { page_number: 2, items_per_page: 10 }),
/// };
/// assert_eq!(
///     serialize_request_params_for_hub(&params).to_query_string(),
///     "filter=name%3D%22app-a%22&sort=asc%3Aname&limit=10&offset=10"
/// );
/// ```
pub fn serialize_request_params_for_hub(params: &HubRequestParams) -> HubQuery {
    let mut query = HubQuery::new();

    if let Some(filters) = &params.filters {
        let terms: Vec<_> = filters
            .iter()
            .filter(|f| !f.value.is_empty())
            .map(serialize_filter_for_hub)
            .collect();
        if !terms.is_empty() {
            query.append("filter", terms.join(","));
        }
    }

    if let Some(sort) = &params.sort {
        query.append("sort", format!("{}:{}", sort.direction, sort.field));
    }

    if let Some(page) = &params.page {
        let offset = page.page_number.saturating_sub(1).saturating_mul(page.items_per_page);
        query.append("limit", page.items_per_page.to_string());
        query.append("offset", offset.to_string());
    }

    query
}

/// Cursor over one `filter` parameter.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn is_done(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The term starting at `start`, up to the next comma, for error messages.
    fn term_from(&self, start: usize) -> String {
        let term = &self.input[start..];
        term.split(',').next().unwrap_or(term).to_string()
    }

    fn field(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || "=!~<>".contains(c) {
                break;
            }
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn operator(&mut self) -> Option<FilterOperator> {
        let operator = FilterOperator::ALL
            .into_iter()
            .find(|op| self.rest().starts_with(op.as_str()))?;
        self.pos += operator.as_str().len();
        Some(operator)
    }

    /// Whether a `"` at byte `at` of the input ends a value: it is followed
    /// by the end of input or a term, list or value separator.
    fn closes_at(&self, at: usize) -> bool {
        matches!(self.input[at + 1..].chars().next(), None | Some(',' | '|' | ')'))
    }

    /// Whether the `\"` whose quote sits at byte `at` is an escaped quote.
    ///
    /// Backslashes are not escaped on the wire, so a value ending in `\`
    /// produces `\"` as its closing quote. The pair is read as an escape
    /// unless it is followed by a separator and the next unescaped quote
    /// could not close the value.
    fn is_escaped_quote(&self, at: usize) -> bool {
        if !self.closes_at(at) {
            return true;
        }
        let rest = &self.input[at + 1..];
        let mut prev = '"';
        for (offset, c) in rest.char_indices() {
            if c == '"' && prev != '\\' {
                return self.closes_at(at + 1 + offset);
            }
            prev = c;
        }
        false
    }

    /// A quoted string; the opening quote has not been consumed yet.
    fn quoted(&mut self, term_start: usize) -> Result<String, ParseError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedQuote(self.term_from(term_start))),
                Some('\\') if self.peek() == Some('"') => {
                    let escaped = self.is_escaped_quote(self.pos);
                    self.bump();
                    if !escaped {
                        value.push('\\');
                        return Ok(value);
                    }
                    value.push('"');
                }
                Some('"') => return Ok(value),
                Some(c) => value.push(c),
            }
        }
    }

    /// An unquoted value running up to one of `stops`.
    fn bare(&mut self, stops: &str) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(c) {
                break;
            }
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn list(&mut self, term_start: usize) -> Result<HubFilterValue, ParseError> {
        self.bump();
        let mut list = Vec::new();
        let mut separator = None;
        loop {
            let value = match self.peek() {
                Some('"') => self.quoted(term_start)?,
                Some(_) => self.bare("|,)"),
                None => return Err(ParseError::UnterminatedList(self.term_from(term_start))),
            };
            list.push(value);
            match self.bump() {
                Some(')') => break,
                Some(c @ ('|' | ',')) => {
                    if separator.is_some_and(|s| s != c) {
                        return Err(ParseError::MixedListOperators(self.term_from(term_start)));
                    }
                    separator = Some(c);
                }
                None => return Err(ParseError::UnterminatedList(self.term_from(term_start))),
                Some(_) => return Err(ParseError::TrailingInput(self.term_from(term_start))),
            }
        }
        let operator = match separator {
            Some(',') => LogicOperator::And,
            _ => LogicOperator::Or,
        };
        Ok(HubFilterValue::List { operator, list })
    }

    fn term(&mut self) -> Result<HubFilter, ParseError> {
        let start = self.pos;
        let field = self.field();
        let operator = self
            .operator()
            .ok_or_else(|| ParseError::MissingOperator(self.term_from(start)))?;
        if field.is_empty() {
            return Err(ParseError::MissingField(self.term_from(start)));
        }
        let value = match self.peek() {
            Some('"') => HubFilterValue::String(self.quoted(start)?),
            Some('(') => self.list(start)?,
            _ => HubFilterValue::String(self.bare(",")),
        };
        Ok(HubFilter {
            field: field.to_string(),
            operator,
            value,
        })
    }
}

/// Parses the value of a `filter` parameter into its filters.
///
/// Quoted values are decoded as strings, so a number sent as `"5"` comes back
/// as the string `5`. Unquoted values are accepted. A `\"` followed by a
/// separator closes a value ending in a backslash unless a later quote could
/// close it instead.
pub fn parse_filters(input: &str) -> Result<Vec<HubFilter>, ParseError> {
    let mut scanner = Scanner::new(input);
    let mut filters = Vec::new();
    while !scanner.is_done() {
        let start = scanner.pos;
        filters.push(scanner.term()?);
        match scanner.bump() {
            None | Some(',') => {}
            Some(_) => return Err(ParseError::TrailingInput(scanner.term_from(start))),
        }
    }
    Ok(filters)
}

fn parse_number(key: &str, value: &str) -> Result<usize, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Decodes hub query parameters back into request parameters.
///
/// Repeated `filter` parameters are concatenated. The page number is derived
/// from `offset / limit + 1`; a missing `offset` means the first page.
pub fn deserialize_request_params_from_hub(query: &HubQuery) -> Result<HubRequestParams, ParseError> {
    let mut params = HubRequestParams::default();

    let mut filters = Vec::new();
    for value in query.get_all("filter") {
        filters.extend(parse_filters(value)?);
    }
    if !filters.is_empty() {
        params.filters = Some(filters);
    }

    if let Some(sort) = query.get("sort") {
        let (direction, field) = sort
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidSort(sort.to_string()))?;
        let direction: SortDirection = direction
            .parse()
            .map_err(|_| ParseError::InvalidSort(sort.to_string()))?;
        if field.is_empty() {
            return Err(ParseError::InvalidSort(sort.to_string()));
        }
        params.sort = Some(HubSort {
            field: field.to_string(),
            direction,
        });
    }

    if let Some(limit) = query.get("limit") {
        let items_per_page = parse_number("limit", limit)?;
        if items_per_page == 0 {
            return Err(ParseError::InvalidNumber {
                key: "limit".into(),
                value: limit.to_string(),
            });
        }
        let offset = match query.get("offset") {
            Some(offset) => parse_number("offset", offset)?,
            None => 0,
        };
        params.page = Some(HubPage {
            page_number: offset / items_per_page + 1,
            items_per_page,
        });
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_params() -> HubRequestParams {
        HubRequestParams {
            filters: Some(vec![
                HubFilter::new("name", FilterOperator::Like, "app"),
                HubFilter::new(
                    "tag.id",
                    FilterOperator::Equal,
                    HubFilterValue::list(LogicOperator::Or, ["1", "2"]),
                ),
                HubFilter::new(
                    "risk",
                    FilterOperator::Equal,
                    HubFilterValue::list(LogicOperator::And, ["red", "amber"]),
                ),
            ]),
            sort: Some(HubSort {
                field: "name".into(),
                direction: SortDirection::Desc,
            }),
            page: Some(HubPage {
                page_number: 3,
                items_per_page: 20,
            }),
        }
    }

    #[test]
    fn test_serialize_full_request() {
        let query = serialize_request_params_for_hub(&full_params());
        assert_eq!(
            query.pairs(),
            &[
                (
                    "filter".to_string(),
                    r#"name~"app",tag.id=("1"|"2"),risk=("red","amber")"#.to_string()
                ),
                ("sort".to_string(), "desc:name".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("offset".to_string(), "40".to_string()),
            ]
        );
    }

    #[test]
    fn test_scenario_query_string() {
        let params = HubRequestParams {
            filters: Some(vec![HubFilter::new("name", FilterOperator::Equal, "app-a")]),
            sort: Some(HubSort {
                field: "name".into(),
                direction: SortDirection::Asc,
            }),
            page: Some(HubPage {
                page_number: 2,
                items_per_page: 10,
            }),
        };
        assert_eq!(
            serialize_request_params_for_hub(&params).to_query_string(),
            "filter=name%3D%22app-a%22&sort=asc%3Aname&limit=10&offset=10"
        );
    }

    #[test]
    fn test_empty_params_produce_empty_query() {
        let query = serialize_request_params_for_hub(&HubRequestParams::default());
        assert!(query.is_empty());
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn test_empty_filter_values_are_dropped() {
        let params = HubRequestParams {
            filters: Some(vec![
                HubFilter::new("name", FilterOperator::Like, ""),
                HubFilter::new("tag", FilterOperator::Equal, HubFilterValue::list(LogicOperator::Or, Vec::<String>::new())),
            ]),
            ..Default::default()
        };
        assert!(serialize_request_params_for_hub(&params).get("filter").is_none());
    }

    #[test]
    fn test_numbers_are_quoted() {
        let filter = HubFilter::new("effort", FilterOperator::GreaterThanOrEqual, 5.0);
        assert_eq!(serialize_filter_for_hub(&filter), r#"effort>="5""#);
        let filter = HubFilter::new("score", FilterOperator::LessThan, 2.5);
        assert_eq!(serialize_filter_for_hub(&filter), r#"score<"2.5""#);
    }

    #[test]
    fn test_every_quote_is_escaped() {
        assert_eq!(wrap_in_quotes_and_escape(r#"say "hi" "there""#), r#""say \"hi\" \"there\"""#);
        let filter = HubFilter::new("name", FilterOperator::Equal, r#"a"b"#);
        let parsed = parse_filters(&serialize_filter_for_hub(&filter)).unwrap();
        assert_eq!(parsed, vec![filter]);
    }

    #[test]
    fn test_trailing_backslash_closes_the_value() {
        let path = HubFilter::new("path", FilterOperator::Equal, r"C:\dir\");
        let name = HubFilter::new("name", FilterOperator::Equal, "x");
        assert_eq!(serialize_filter_for_hub(&path), r#"path="C:\dir\""#);

        let alone = parse_filters(&serialize_filter_for_hub(&path)).unwrap();
        assert_eq!(alone, vec![path.clone()]);

        let wire = format!("{},{}", serialize_filter_for_hub(&path), serialize_filter_for_hub(&name));
        assert_eq!(parse_filters(&wire).unwrap(), vec![path, name]);

        let listed = HubFilter::new(
            "dir",
            FilterOperator::Equal,
            HubFilterValue::list(LogicOperator::Or, [r"a\", "b"]),
        );
        assert_eq!(parse_filters(&serialize_filter_for_hub(&listed)).unwrap(), vec![listed]);
    }

    #[test]
    fn test_escaped_quote_before_separator() {
        let filter = HubFilter::new("name", FilterOperator::Equal, r#"a","#);
        assert_eq!(serialize_filter_for_hub(&filter), r#"name="a\",""#);
        assert_eq!(parse_filters(&serialize_filter_for_hub(&filter)).unwrap(), vec![filter]);
    }

    #[test]
    fn test_huge_page_number_saturates_offset() {
        let params = HubRequestParams {
            page: Some(HubPage {
                page_number: usize::MAX,
                items_per_page: 10,
            }),
            ..Default::default()
        };
        let query = serialize_request_params_for_hub(&params);
        assert_eq!(query.get("offset"), Some(usize::MAX.to_string().as_str()));
    }

    #[test]
    fn test_round_trip_through_query_string() {
        let params = full_params();
        let encoded = serialize_request_params_for_hub(&params).to_query_string();
        let decoded = deserialize_request_params_from_hub(&HubQuery::from_query_string(&encoded)).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_parse_operators() {
        let filters = parse_filters(r#"a!="1",b>="2",c<="3",d>"4",e<"5",f~"6",g="7""#).unwrap();
        let operators: Vec<_> = filters.iter().map(|f| f.operator).collect();
        assert_eq!(
            operators,
            vec![
                FilterOperator::NotEqual,
                FilterOperator::GreaterThanOrEqual,
                FilterOperator::LessThanOrEqual,
                FilterOperator::GreaterThan,
                FilterOperator::LessThan,
                FilterOperator::Like,
                FilterOperator::Equal,
            ]
        );
    }

    #[test]
    fn test_parse_commas_inside_quotes() {
        let filters = parse_filters(r#"name~"a,b",tag=("x,y"|"z")"#).unwrap();
        assert_eq!(
            filters,
            vec![
                HubFilter::new("name", FilterOperator::Like, "a,b"),
                HubFilter::new(
                    "tag",
                    FilterOperator::Equal,
                    HubFilterValue::list(LogicOperator::Or, ["x,y", "z"])
                ),
            ]
        );
    }

    #[test]
    fn test_parse_unquoted_values() {
        let filters = parse_filters("id=5,tag=(a|b)").unwrap();
        assert_eq!(
            filters,
            vec![
                HubFilter::new("id", FilterOperator::Equal, "5"),
                HubFilter::new("tag", FilterOperator::Equal, HubFilterValue::list(LogicOperator::Or, ["a", "b"])),
            ]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_filters(r#"name"app""#),
            Err(ParseError::MissingOperator(r#"name"app""#.into()))
        );
        assert_eq!(parse_filters(r#"="x""#), Err(ParseError::MissingField(r#"="x""#.into())));
        assert_eq!(
            parse_filters(r#"name="app"#),
            Err(ParseError::UnterminatedQuote(r#"name="app"#.into()))
        );
        assert_eq!(
            parse_filters(r#"tag=("a"|"b""#),
            Err(ParseError::UnterminatedList(r#"tag=("a"|"b""#.into()))
        );
        assert!(matches!(
            parse_filters(r#"tag=("a"|"b","c")"#),
            Err(ParseError::MixedListOperators(_))
        ));
        assert!(matches!(parse_filters(r#"name="a"x"#), Err(ParseError::TrailingInput(_))));
    }

    #[test]
    fn test_deserialize_sort_and_page() {
        let query = HubQuery::from_query_string("?sort=asc%3Aname&limit=25&offset=50");
        let params = deserialize_request_params_from_hub(&query).unwrap();
        assert_eq!(params.filters, None);
        assert_eq!(
            params.sort,
            Some(HubSort {
                field: "name".into(),
                direction: SortDirection::Asc
            })
        );
        assert_eq!(
            params.page,
            Some(HubPage {
                page_number: 3,
                items_per_page: 25
            })
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_sort_and_numbers() {
        let bad_sort = HubQuery::from_query_string("sort=sideways:name");
        assert_eq!(
            deserialize_request_params_from_hub(&bad_sort),
            Err(ParseError::InvalidSort("sideways:name".into()))
        );
        let bad_limit = HubQuery::from_query_string("limit=ten");
        assert_eq!(
            deserialize_request_params_from_hub(&bad_limit),
            Err(ParseError::InvalidNumber {
                key: "limit".into(),
                value: "ten".into()
            })
        );
        let zero_limit = HubQuery::from_query_string("limit=0");
        assert!(deserialize_request_params_from_hub(&zero_limit).is_err());
    }

    #[test]
    fn test_repeated_filter_params_are_concatenated() {
        let mut query = HubQuery::new();
        query.append("filter", r#"a="1""#);
        query.append("filter", r#"b="2""#);
        let params = deserialize_request_params_from_hub(&query).unwrap();
        assert_eq!(params.filters.map(|f| f.len()), Some(2));
    }
}
