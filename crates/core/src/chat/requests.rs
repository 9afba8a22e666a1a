use serde::Deserialize;

/// Body of `PUT /messages`.
///
/// A missing `message` field parses as an empty string; content is not validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_field() {
        let request: CreateMessageRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
    }

    #[test]
    fn missing_message_defaults_to_empty() {
        let request: CreateMessageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.message, "");
    }

    #[test]
    fn rejects_non_string_message() {
        let result = serde_json::from_str::<CreateMessageRequest>(r#"{"message":42}"#);
        assert!(result.is_err());
    }
}
