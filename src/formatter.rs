//! Payload formatters for the supported content types.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Failure to turn a value into a body or a body into a value.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// JSON (de)serialization failed.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// XML (de)serialization failed.
    #[error("XML: {0}")]
    Xml(String),

    /// The body is not valid UTF-8.
    #[error("body is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Serializes and deserializes entities for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// `application/json` through `serde_json`.
    Json,
    /// `application/xml` through `quick-xml`.
    ///
    /// Entities are written with their type name as the root element.
    Xml,
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Sequence<T> {
    #[serde(rename = "$value", default)]
    items: Vec<T>,
}

impl Formatter {
    /// The media type sent in `Content-Type` and `Accept`.
    pub fn media_type(&self) -> &'static str {
        match self {
            Formatter::Json => "application/json",
            Formatter::Xml => "application/xml",
        }
    }

    /// Serializes `value` into a fully buffered body.
    pub fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, FormatError> {
        match self {
            Formatter::Json => Ok(serde_json::to_vec(value)?),
            Formatter::Xml => quick_xml::se::to_string(value)
                .map(String::into_bytes)
                .map_err(|e| FormatError::Xml(e.to_string())),
        }
    }

    /// Deserializes a single entity.
    pub fn deserialize<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, FormatError> {
        match self {
            Formatter::Json => Ok(serde_json::from_slice(body)?),
            Formatter::Xml => quick_xml::de::from_str(std::str::from_utf8(body)?)
                .map_err(|e| FormatError::Xml(e.to_string())),
        }
    }

    /// Deserializes an ordered sequence of entities.
    ///
    /// JSON bodies are arrays. XML bodies are a root element whose children are
    /// the entities, such as `<ArrayOfUser><User>..</User></ArrayOfUser>`.
    pub fn deserialize_many<T: DeserializeOwned>(&self, body: &[u8]) -> Result<Vec<T>, FormatError> {
        match self {
            Formatter::Json => Ok(serde_json::from_slice(body)?),
            Formatter::Xml => quick_xml::de::from_str::<Sequence<T>>(std::str::from_utf8(body)?)
                .map(|sequence| sequence.items)
                .map_err(|e| FormatError::Xml(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct User {
        id: u32,
        name: String,
    }

    fn alice() -> User {
        User {
            id: 1,
            name: "Alice".to_string(),
        }
    }

    #[test]
    fn media_types() {
        assert_eq!(Formatter::Json.media_type(), "application/json");
        assert_eq!(Formatter::Xml.media_type(), "application/xml");
    }

    #[test]
    fn json_entity() {
        let body = Formatter::Json.serialize(&alice()).unwrap();
        assert_eq!(body, br#"{"id":1,"name":"Alice"}"#);
        let back: User = Formatter::Json.deserialize(&body).unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn xml_entity_uses_type_name_as_root() {
        let body = Formatter::Xml.serialize(&alice()).unwrap();
        let text = String::from_utf8(body.clone()).unwrap();
        assert!(text.starts_with("<User>"));
        assert!(text.contains("<name>Alice</name>"));
        let back: User = Formatter::Xml.deserialize(&body).unwrap();
        assert_eq!(back, alice());
    }

    #[test]
    fn json_sequence() {
        let users: Vec<User> = Formatter::Json
            .deserialize_many(br#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]"#)
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Bob");
    }

    #[test]
    fn xml_sequence() {
        let body = b"<ArrayOfUser><User><id>1</id><name>Alice</name></User><User><id>2</id><name>Bob</name></User></ArrayOfUser>";
        let users: Vec<User> = Formatter::Xml.deserialize_many(body).unwrap();
        assert_eq!(users, vec![alice(), User { id: 2, name: "Bob".to_string() }]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(Formatter::Json.deserialize::<User>(b"not json").is_err());
        assert!(matches!(
            Formatter::Xml.deserialize::<User>(&[0xff, 0xfe]),
            Err(FormatError::Utf8(_))
        ));
    }
}
