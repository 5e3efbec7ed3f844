//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// HTTP request body sent to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// JSON document
    Json(serde_json::Value),
    /// Form URL encoded pairs, in submission order
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Creates a JSON body.
    #[must_use]
    pub const fn json(value: serde_json::Value) -> Self {
        Self::Json(value)
    }

    /// Creates a form body from key/value pairs.
    #[must_use]
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Returns whether there is nothing to send.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Form(_) => Some("application/x-www-form-urlencoded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_body() {
        let body = RequestBody::json(serde_json::json!({"quantity": 1}));
        assert_eq!(body.content_type(), Some("application/json"));
        assert!(!body.is_empty());
    }

    #[test]
    fn test_form_body_keeps_order() {
        let body = RequestBody::form([("csrfToken", "abc"), ("email", "joe@vexo.com")]);
        let RequestBody::Form(pairs) = &body else {
            unreachable!("form constructor builds a form body");
        };
        assert_eq!(pairs[0].0, "csrfToken");
        assert_eq!(pairs[1].1, "joe@vexo.com");
        assert_eq!(body.content_type(), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn test_none_body() {
        assert!(RequestBody::none().is_empty());
        assert_eq!(RequestBody::none().content_type(), None);
    }
}
