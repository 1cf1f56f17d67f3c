use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConsoleError, ConsoleResult};
use crate::values::js_like_value_string;

/// Status code carried by every CIMS response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResponseCode {
    Success,
    NoDataFound,
    NotAuthorised,
    Error,
    Duplicated,
    Fail,
    Other(String),
}

impl ResponseCode {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseCode::Success => "00",
            ResponseCode::NoDataFound => "01",
            ResponseCode::NotAuthorised => "02",
            ResponseCode::Error => "03",
            ResponseCode::Duplicated => "04",
            ResponseCode::Fail => "10",
            ResponseCode::Other(code) => code.as_str(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseCode::Success)
    }
}

impl From<String> for ResponseCode {
    fn from(code: String) -> Self {
        match code.trim() {
            "00" => ResponseCode::Success,
            "01" => ResponseCode::NoDataFound,
            "02" => ResponseCode::NotAuthorised,
            "03" => ResponseCode::Error,
            "04" => ResponseCode::Duplicated,
            "10" => ResponseCode::Fail,
            _ => ResponseCode::Other(code),
        }
    }
}

impl From<ResponseCode> for String {
    fn from(code: ResponseCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ code, message, content? }` as returned by every CRUD endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: ResponseCode,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub content: Option<Value>,
}

/// Successful envelope with the message already rendered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub message: String,
    pub content: Value,
}

impl Envelope {
    pub fn parse(body: &str) -> ConsoleResult<Self> {
        serde_json::from_str(body).map_err(|err| ConsoleError::Decode(err.to_string()))
    }

    /// Message as shown in a toast; array messages join with `,`.
    pub fn message_text(&self) -> String {
        js_like_value_string(Some(&self.message))
    }

    pub fn into_result(self) -> ConsoleResult<Success> {
        let message = self.message_text();
        if self.code.is_success() {
            Ok(Success {
                message,
                content: self.content.unwrap_or(Value::Null),
            })
        } else {
            Err(ConsoleError::Business {
                code: self.code,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_keeps_content() {
        let success = Envelope::parse(r#"{"code":"00","message":"Saved","content":[{"id":1}]}"#)
            .and_then(Envelope::into_result)
            .expect("success");
        assert_eq!(success.message, "Saved");
        assert_eq!(success.content, json!([{"id": 1}]));
    }

    #[test]
    fn failure_codes_become_business_errors() {
        let err = Envelope::parse(r#"{"code":"10","message":["Name required","Status required"]}"#)
            .and_then(Envelope::into_result)
            .expect_err("business failure");
        match err {
            ConsoleError::Business { code, message } => {
                assert_eq!(code, ResponseCode::Fail);
                assert_eq!(message, "Name required,Status required");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_codes_are_preserved() {
        let code = ResponseCode::from("77".to_string());
        assert_eq!(code, ResponseCode::Other("77".to_string()));
        assert_eq!(code.to_string(), "77");
        assert_eq!(ResponseCode::from("04".to_string()), ResponseCode::Duplicated);
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        assert!(matches!(
            Envelope::parse("<html>"),
            Err(ConsoleError::Decode(_))
        ));
    }
}
