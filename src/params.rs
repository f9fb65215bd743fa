//! Path variable and query string containers.
//!
//! This module provides the two maps carried by a [`Signal`](crate::Signal):
//!
//! - [`PathVariables`]: values captured by the placeholders of the matched
//!   path expression, kept in declaration order.
//! - [`QueryParams`]: the `?key=value&...` part of the URL as an ordered
//!   multimap: keys in first-appearance order, values in appearance order.
//!
//! # Example
//!
//! ```
//! use neuro_router::{PathVariables, QueryParams};
//!
//! let mut vars = PathVariables::new();
//! vars.insert("id".to_string(), "42".to_string());
//! assert_eq!(vars.get_as::<u32>("id"), Some(42));
//!
//! let query = QueryParams::from_query_string("source=banner&source=app&page=2");
//! assert_eq!(query.get_all("source"), Some(&["banner".to_string(), "app".to_string()][..]));
//! assert_eq!(query.get_as::<u32>("page"), Some(2));
//! ```

use url::form_urlencoded;

/// Variables captured from a matched path expression.
///
/// Iteration order is the order in which placeholders appear in the
/// expression. Inserting an existing name overwrites its value in place.
///
/// # Example
///
/// ```
/// use neuro_router::PathVariables;
///
/// // Expression: /users/<user_id>/posts/<post_id>
/// // Matched path: /users/7/posts/99
/// let mut vars = PathVariables::new();
/// vars.insert("user_id".to_string(), "7".to_string());
/// vars.insert("post_id".to_string(), "99".to_string());
///
/// assert_eq!(vars.get("user_id"), Some("7"));
/// assert_eq!(vars.get_as::<i64>("post_id"), Some(99));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables {
    entries: Vec<(String, String)>,
}

impl PathVariables {
    /// Create empty variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a variable and parse it as a specific type
    ///
    /// Returns `None` if the variable doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, name: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(name)?.parse().ok()
    }

    /// Insert or overwrite a variable.
    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Return `true` if the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Return `true` if there are no variables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the number of variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a URL query string
///
/// Supports multiple values for the same key. Keys keep the order of their
/// first appearance and each key's values keep their appearance order.
///
/// # Example
///
/// ```
/// use neuro_router::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&tag=rust&tag=url");
///
/// assert_eq!(query.get("page"), Some("1"));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Create empty query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// Percent escapes and `+` are decoded. Malformed escapes are decoded
    /// lossily instead of failing, so a bad query never blocks routing.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
        params
    }

    /// Get the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)?.first().map(String::as_str)
    }

    /// Get all values for a key, in appearance order.
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Get the first value for a key, parsed as type `T`.
    ///
    /// Returns `None` if the key is missing or the value cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Append a value for the given key.
    ///
    /// If the key already exists, the new value is added to the list (not replaced).
    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Return `true` if the given key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in first-appearance order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Serialize back into a query string.
    ///
    /// # Example
    ///
    /// ```
    /// use neuro_router::QueryParams;
    ///
    /// let query = QueryParams::from_query_string("q=hello+world&tag=a&tag=b");
    /// assert_eq!(query.to_query_string(), "q=hello+world&tag=a&tag=b");
    /// ```
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Return `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the number of unique parameter keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_basic() {
        let mut vars = PathVariables::new();
        vars.insert("id".to_string(), "123".to_string());

        assert_eq!(vars.get("id"), Some("123"));
        assert!(vars.contains("id"));
        assert!(!vars.contains("missing"));
    }

    #[test]
    fn test_variables_get_as() {
        let mut vars = PathVariables::new();
        vars.insert("id".to_string(), "123".to_string());
        vars.insert("active".to_string(), "true".to_string());

        assert_eq!(vars.get_as::<i32>("id"), Some(123));
        assert_eq!(vars.get_as::<bool>("active"), Some(true));
        assert_eq!(vars.get_as::<i32>("active"), None);
        assert_eq!(vars.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_variables_overwrite_keeps_position() {
        let mut vars = PathVariables::new();
        vars.insert("a".to_string(), "1".to_string());
        vars.insert("b".to_string(), "2".to_string());
        vars.insert("a".to_string(), "3".to_string());

        let pairs: Vec<(&str, &str)> = vars.iter().collect();
        assert_eq!(pairs, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_variables_empty() {
        let vars = PathVariables::new();
        assert!(vars.is_empty());
        assert_eq!(vars.len(), 0);
    }

    #[test]
    fn test_query_multiple_values_in_order() {
        let query = QueryParams::from_query_string("source=banner&source=app");
        assert_eq!(
            query.get_all("source").unwrap(),
            ["banner".to_string(), "app".to_string()]
        );
        assert_eq!(query.get("source"), Some("banner"));
    }

    #[test]
    fn test_query_key_order() {
        let query = QueryParams::from_query_string("z=1&a=2&z=3&m=4");
        let keys: Vec<&str> = query.keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_query_decoding() {
        let query = QueryParams::from_query_string("q=hello%20world&name=a+b&flag");
        assert_eq!(query.get("q"), Some("hello world"));
        assert_eq!(query.get("name"), Some("a b"));
        assert_eq!(query.get("flag"), Some(""));
    }

    #[test]
    fn test_query_malformed_escape_is_lossy() {
        let query = QueryParams::from_query_string("bad=%zz&ok=1");
        assert_eq!(query.get("bad"), Some("%zz"));
        assert_eq!(query.get("ok"), Some("1"));
    }

    #[test]
    fn test_query_insert() {
        let mut query = QueryParams::new();
        query.insert("key".to_string(), "value1".to_string());
        query.insert("key".to_string(), "value2".to_string());

        let values = query.get_all("key").unwrap();
        assert_eq!(values, ["value1".to_string(), "value2".to_string()]);
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_empty_query_string() {
        let query = QueryParams::from_query_string("");
        assert!(query.is_empty());
    }
}
