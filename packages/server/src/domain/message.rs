//! Chat message value object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message as it travels between peers.
///
/// Immutable once constructed. Every delivery gets its own clone, so the
/// struct only carries owned data.
///
/// ## Wire format
///
/// ```json
/// {"sender":"alice","text":"hi","timestamp":"2023-01-01T00:00:00.123456789Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: String,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Encode as a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from a JSON text frame
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_timestamp() -> DateTime<Utc> {
        Utc.timestamp_opt(1_672_531_200, 123_456_789).unwrap()
    }

    #[test]
    fn test_json_keeps_sub_second_timestamp() {
        // テスト項目: JSON 変換でタイムスタンプのサブ秒精度が失われない
        // given (前提条件):
        let message = Message::new("alice", "hi", sample_timestamp());

        // when (操作):
        let json = message.to_json().unwrap();
        let decoded = Message::from_json(&json).unwrap();

        // then (期待する結果):
        assert_eq!(decoded, message);
        assert_eq!(decoded.timestamp().timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_json_field_names() {
        // テスト項目: ワイヤ形式のフィールド名が sender / text / timestamp である
        // given (前提条件):
        let message = Message::new("bob", "hello", sample_timestamp());

        // when (操作):
        let value: serde_json::Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(value["sender"], "bob");
        assert_eq!(value["text"], "hello");
        assert!(
            value["timestamp"]
                .as_str()
                .unwrap()
                .starts_with("2023-01-01T00:00:00.123456789")
        );
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        // テスト項目: 必須フィールドが欠けた JSON はエラーになる
        // given (前提条件):
        let json = r#"{"sender":"alice","text":"hi"}"#;

        // when (操作):
        let result = Message::from_json(json);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
