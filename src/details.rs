//! Translation of non-success responses into structured errors.
//!
//! Controller APIs usually describe failures with a JSON envelope such as
//!
//! ```json
//! {
//!   "Message": "The request is invalid.",
//!   "ExceptionMessage": "Name is required",
//!   "ExceptionType": "System.ArgumentException",
//!   "StackTrace": "...",
//!   "ModelState": { "Name": ["Required"] }
//! }
//! ```
//!
//! Every field is optional. Bodies that are not such an envelope are kept as
//! plain text.

use crate::{transport::TransportResponse, Error};
use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer,
};
use std::fmt;

/// Server supplied details about a failed call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionDetails {
    /// `ExceptionMessage` if present, else `Message`, else the raw body text.
    pub message: Option<String>,
    /// The HTTP reason phrase of the response.
    pub reason: Option<String>,
    /// Server side stack trace, when the server exposes one.
    pub stack_trace: Option<String>,
    /// Field level validation messages as `(field, messages)`.
    ///
    /// Fields and the messages of each field keep the order the server sent.
    pub model_state: Vec<(String, Vec<String>)>,
    /// Name of the server side exception type.
    pub exception_type: Option<String>,
}

impl ExceptionDetails {
    /// Returns the validation messages reported for `field`.
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.model_state
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Returns `true` if the server reported any field level validation errors.
    pub fn has_model_errors(&self) -> bool {
        self.model_state
            .iter()
            .any(|(_, messages)| !messages.is_empty())
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "ExceptionMessage")]
    exception_message: Option<String>,
    #[serde(rename = "ExceptionType")]
    exception_type: Option<String>,
    #[serde(rename = "StackTrace")]
    stack_trace: Option<String>,
    #[serde(rename = "ModelState", default, deserialize_with = "ordered_fields")]
    model_state: Vec<(String, Vec<String>)>,
}

/// Reads a JSON object into `(key, value)` pairs in document order.
fn ordered_fields<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Fields;

    impl<'de> Visitor<'de> for Fields {
        type Value = Vec<(String, Vec<String>)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field names to message lists")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                fields.push(entry);
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_any(Fields)
}

/// Parses an error body into [`ExceptionDetails`], leaving `reason` unset.
pub fn parse_details(body: &str) -> ExceptionDetails {
    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => ExceptionDetails {
            message: envelope.exception_message.or(envelope.message),
            reason: None,
            stack_trace: envelope.stack_trace,
            model_state: envelope.model_state,
            exception_type: envelope.exception_type,
        },
        Err(_) if !body.is_empty() => ExceptionDetails {
            message: Some(body.to_string()),
            ..ExceptionDetails::default()
        },
        Err(_) => ExceptionDetails::default(),
    }
}

/// Converts a non-success response into [`Error::RemoteCallFailed`].
///
/// # Examples
///
/// ```
/// use restcall::{details::translate, transport::TransportResponse, Error};
/// use http::StatusCode;
///
/// let response = TransportResponse::new(StatusCode::NOT_FOUND, r#"{"Message":"Not found"}"#);
/// let err = translate(&response);
///
/// assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
/// assert_eq!(err.remote_message(), Some("Not found"));
/// ```
pub fn translate(response: &TransportResponse) -> Error {
    let mut details = parse_details(&response.text());
    details.reason = response.reason().map(str::to_string);

    Error::RemoteCallFailed {
        status: response.status,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn message_is_used_when_no_exception_message() {
        let details = parse_details(r#"{"Message":"Not found"}"#);
        assert_eq!(details.message.as_deref(), Some("Not found"));
        assert!(details.model_state.is_empty());
        assert!(details.exception_type.is_none());
    }

    #[test]
    fn exception_message_wins_over_message() {
        let details = parse_details(
            r#"{"Message":"An error has occurred.","ExceptionMessage":"Bad","ExceptionType":"System.ArgumentException","StackTrace":"at Foo()"}"#,
        );
        assert_eq!(details.message.as_deref(), Some("Bad"));
        assert_eq!(
            details.exception_type.as_deref(),
            Some("System.ArgumentException")
        );
        assert_eq!(details.stack_trace.as_deref(), Some("at Foo()"));
    }

    #[test]
    fn model_state_keeps_message_order() {
        let details = parse_details(
            r#"{"ExceptionMessage":"Bad","ModelState":{"Name":["Required","Too short"],"Age":["Out of range"]}}"#,
        );
        assert_eq!(details.field_errors("Name"), ["Required", "Too short"]);
        assert_eq!(details.field_errors("Age"), ["Out of range"]);
        assert!(details.field_errors("Email").is_empty());
        assert!(details.has_model_errors());
    }

    #[test]
    fn model_state_keeps_field_order() {
        let details = parse_details(
            r#"{"ModelState":{"Zip":["Invalid"],"Name":["Required"],"Age":["Out of range"]}}"#,
        );
        let fields: Vec<&str> = details
            .model_state
            .iter()
            .map(|(field, _)| field.as_str())
            .collect();
        assert_eq!(fields, ["Zip", "Name", "Age"]);
    }

    #[test]
    fn null_model_state_is_empty() {
        let details = parse_details(r#"{"Message":"Bad","ModelState":null}"#);
        assert_eq!(details.message.as_deref(), Some("Bad"));
        assert!(details.model_state.is_empty());
        assert!(!details.has_model_errors());
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let details = parse_details("Server exploded");
        assert_eq!(details.message.as_deref(), Some("Server exploded"));
        assert!(details.stack_trace.is_none());
    }

    #[test]
    fn empty_body_leaves_everything_unset() {
        assert_eq!(parse_details(""), ExceptionDetails::default());
    }

    #[test]
    fn translate_sets_reason_and_status() {
        let response = TransportResponse::new(StatusCode::BAD_REQUEST, "nope");
        match translate(&response) {
            Error::RemoteCallFailed { status, details } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(details.reason.as_deref(), Some("Bad Request"));
                assert_eq!(details.message.as_deref(), Some("nope"));
            }
            other => panic!("Expected RemoteCallFailed, got {:?}", other),
        }
    }
}
