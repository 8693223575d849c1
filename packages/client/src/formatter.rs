//! Message formatting utilities for client display.

use hiroba_server::domain::Message;
use hiroba_shared::time::to_local_display;

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a broadcast chat message
    ///
    /// # Arguments
    ///
    /// * `message` - The received message
    /// * `own_username` - This client's username, to mark echoes as "(me)"
    pub fn format_chat_message(message: &Message, own_username: &str) -> String {
        let me_suffix = if message.sender() == own_username {
            " (me)"
        } else {
            ""
        };
        format!(
            "\n\n{rule}\n@{}{}: {}\nsent at {}\n{rule}\n",
            message.sender(),
            me_suffix,
            message.text(),
            to_local_display(&message.timestamp()),
            rule = RULE,
        )
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_chat_message() {
        // テスト項目: チャットメッセージが正しくフォーマットされる
        // given (前提条件):
        let sent_at = Utc.timestamp_opt(1_672_531_200, 0).unwrap();
        let message = Message::new("alice", "Hello, world!", sent_at);

        // when (操作):
        let result = MessageFormatter::format_chat_message(&message, "bob");

        // then (期待する結果):
        assert!(result.contains("@alice: Hello, world!"));
        assert!(result.contains(&format!("sent at {}", to_local_display(&sent_at))));
        assert!(result.contains(RULE));
        assert!(!result.contains("(me)"));
    }

    #[test]
    fn test_format_chat_message_marks_own_echo() {
        // テスト項目: 自分が送ったメッセージのエコーには (me) が付く
        // given (前提条件):
        let message = Message::new("alice", "hi", Utc::now());

        // when (操作):
        let result = MessageFormatter::format_chat_message(&message, "alice");

        // then (期待する結果):
        assert!(result.contains("@alice (me): hi"));
    }

    #[test]
    fn test_format_binary_message() {
        // テスト項目: バイナリメッセージ通知が正しくフォーマットされる
        // when (操作):
        let result = MessageFormatter::format_binary_message(1024);

        // then (期待する結果):
        assert!(result.contains("1024 bytes"));
        assert!(result.contains("Received"));
    }

    #[test]
    fn test_format_raw_message() {
        // テスト項目: 生メッセージが正しくフォーマットされる
        // when (操作):
        let result = MessageFormatter::format_raw_message("unknown message format");

        // then (期待する結果):
        assert!(result.contains("Received: unknown message format"));
    }
}
