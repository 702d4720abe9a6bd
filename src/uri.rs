//! Relative URI generation for controller calls.
//!
//! A call addresses `controller[/action]` and optionally carries one parameter:
//!
//! - a [`Parameter::Scalar`] becomes one more path segment, `controller/action/42`;
//! - a [`Parameter::Structured`] becomes a query string built from its pairs in
//!   insertion order, skipping pairs without a value.
//!
//! Nothing is percent-encoded here. Callers must pre-encode unsafe characters.

use crate::{Error, Result};
use std::fmt;

/// Ordered `key=value` pairs for a structured parameter.
///
/// Pairs keep the order they were added in. Pairs whose value is `None` are
/// kept but never emitted.
///
/// # Examples
///
/// ```
/// use restcall::uri::QueryParams;
///
/// let params = QueryParams::new()
///     .with("page", 2)
///     .with_opt("filter", None::<String>)
///     .with("size", 50);
///
/// assert_eq!(params.to_query_string(), "page=2&size=50");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    /// Creates an empty set of pairs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, Some(value));
        self
    }

    /// Appends a pair that is skipped when `value` is `None`.
    pub fn with_opt<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a pair in place.
    pub fn push<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        self.pairs
            .push((key.into(), value.map(|value| value.to_string())));
    }

    /// Returns the number of pairs that carry a value.
    pub fn present(&self) -> usize {
        self.pairs.iter().filter(|(_, value)| value.is_some()).count()
    }

    /// Joins the present pairs as `k1=v1&k2=v2`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| format!("{}={}", key, value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.push(key, Some(value));
        }
        params
    }
}

/// Types that enumerate their fields as query pairs in a fixed order.
///
/// # Examples
///
/// ```
/// use restcall::uri::{QueryParams, ToQueryParams};
///
/// struct Search {
///     name: String,
///     city: Option<String>,
///     limit: u32,
/// }
///
/// impl ToQueryParams for Search {
///     fn to_query_params(&self) -> QueryParams {
///         QueryParams::new()
///             .with("name", &self.name)
///             .with_opt("city", self.city.as_ref())
///             .with("limit", self.limit)
///     }
/// }
/// ```
pub trait ToQueryParams {
    /// Returns the fields as pairs, in declaration order.
    fn to_query_params(&self) -> QueryParams;
}

impl ToQueryParams for QueryParams {
    fn to_query_params(&self) -> QueryParams {
        self.clone()
    }
}

/// The single optional argument of a read or delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// Appended as a path segment.
    Scalar(String),
    /// Appended as a query string.
    Structured(QueryParams),
}

impl Parameter {
    /// Builds a structured parameter from any [`ToQueryParams`] value.
    pub fn query(value: &impl ToQueryParams) -> Self {
        Parameter::Structured(value.to_query_params())
    }

    /// Returns `true` for a scalar with no text.
    pub fn is_empty(&self) -> bool {
        matches!(self, Parameter::Scalar(value) if value.is_empty())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Scalar(value) => f.write_str(value),
            Parameter::Structured(params) => f.write_str(&params.to_query_string()),
        }
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::Scalar(value.to_string())
    }
}

impl From<String> for Parameter {
    fn from(value: String) -> Self {
        Parameter::Scalar(value)
    }
}

impl From<&String> for Parameter {
    fn from(value: &String) -> Self {
        Parameter::Scalar(value.clone())
    }
}

impl From<QueryParams> for Parameter {
    fn from(value: QueryParams) -> Self {
        Parameter::Structured(value)
    }
}

macro_rules! scalar_parameter {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Parameter {
                fn from(value: $ty) -> Self {
                    Parameter::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_parameter!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char);

/// How a structured parameter is attached to the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryPrefix {
    /// `controller/action?k=v`, used by read calls.
    #[default]
    Question,
    /// `controller/actionk=v`, used by delete calls.
    ///
    /// Servers addressed by delete calls have historically relied on this
    /// form, so it is kept as is.
    None,
}

/// Builds `controller[/action][/scalar | ?query]`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `controller` is empty.
///
/// # Examples
///
/// ```
/// use restcall::uri::{generate_uri, Parameter, QueryParams};
///
/// assert_eq!(generate_uri("Users", None, None)?, "Users");
/// assert_eq!(generate_uri("Users", Some("Active"), None)?, "Users/Active");
/// assert_eq!(
///     generate_uri("Users", Some("Find"), Some(&Parameter::from(7)))?,
///     "Users/Find/7"
/// );
///
/// let search = Parameter::from(QueryParams::new().with("name", "bob").with("age", 30));
/// assert_eq!(
///     generate_uri("Users", None, Some(&search))?,
///     "Users?name=bob&age=30"
/// );
/// # Ok::<(), restcall::Error>(())
/// ```
pub fn generate_uri(
    controller: &str,
    action: Option<&str>,
    parameter: Option<&Parameter>,
) -> Result<String> {
    generate_uri_with(controller, action, parameter, QueryPrefix::Question)
}

/// Like [`generate_uri`], choosing how a structured parameter is attached.
pub fn generate_uri_with(
    controller: &str,
    action: Option<&str>,
    parameter: Option<&Parameter>,
    prefix: QueryPrefix,
) -> Result<String> {
    if controller.is_empty() {
        return Err(Error::InvalidArgument("controller must not be empty".to_string()));
    }

    let mut uri = controller.to_string();

    if let Some(action) = action.filter(|action| !action.is_empty()) {
        uri.push('/');
        uri.push_str(action);
    }

    match parameter {
        Some(Parameter::Structured(params)) => {
            let query = params.to_query_string();
            if !query.is_empty() {
                if prefix == QueryPrefix::Question {
                    uri.push('?');
                }
                uri.push_str(&query);
            }
        }
        Some(Parameter::Scalar(value)) => {
            uri.push('/');
            uri.push_str(value);
        }
        None => {}
    }

    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Filter {
        name: Option<&'static str>,
        city: Option<&'static str>,
        age: Option<u32>,
    }

    impl ToQueryParams for Filter {
        fn to_query_params(&self) -> QueryParams {
            QueryParams::new()
                .with_opt("name", self.name)
                .with_opt("city", self.city)
                .with_opt("age", self.age)
        }
    }

    #[test]
    fn controller_alone() {
        for controller in ["Users", "api/Orders", "x"] {
            assert_eq!(generate_uri(controller, None, None).unwrap(), controller);
        }
    }

    #[test]
    fn controller_and_action() {
        assert_eq!(
            generate_uri("Users", Some("Active"), None).unwrap(),
            "Users/Active"
        );
    }

    #[test]
    fn empty_controller_is_rejected() {
        assert!(matches!(
            generate_uri("", Some("x"), None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn scalar_is_a_path_segment() {
        let uri = generate_uri("Users", Some("Get"), Some(&Parameter::from(42u64))).unwrap();
        assert_eq!(uri, "Users/Get/42");

        let uri = generate_uri("Users", None, Some(&Parameter::from("abc-def"))).unwrap();
        assert!(uri.ends_with("/abc-def"));
    }

    #[test]
    fn structured_keeps_declaration_order_and_skips_absent() {
        let filter = Filter {
            name: Some("ann"),
            city: None,
            age: Some(31),
        };
        let parameter = Parameter::query(&filter);
        let uri = generate_uri("People", Some("Search"), Some(&parameter)).unwrap();
        assert_eq!(uri, "People/Search?name=ann&age=31");

        if let Parameter::Structured(params) = &parameter {
            assert_eq!(params.present(), 2);
        }
    }

    #[test]
    fn structured_without_prefix() {
        let parameter = Parameter::from(QueryParams::from_iter([("id", 5)]));
        let uri =
            generate_uri_with("Users", Some("Remove"), Some(&parameter), QueryPrefix::None).unwrap();
        assert_eq!(uri, "Users/Removeid=5");
    }

    #[test]
    fn all_absent_adds_nothing() {
        let filter = Filter {
            name: None,
            city: None,
            age: None,
        };
        let uri = generate_uri("People", None, Some(&Parameter::query(&filter))).unwrap();
        assert_eq!(uri, "People");
    }

    #[test]
    fn values_are_not_encoded() {
        let parameter = Parameter::from(QueryParams::new().with("q", "a b&c"));
        assert_eq!(
            generate_uri("Find", None, Some(&parameter)).unwrap(),
            "Find?q=a b&c"
        );
    }
}
