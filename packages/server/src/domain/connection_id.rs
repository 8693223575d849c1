//! Connection identifier.

use std::fmt;

use uuid::Uuid;

/// Opaque identifier of one stream session.
///
/// A random UUID v4 generated when the session is created. Carries no
/// ordering semantics and is never reused once the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_returns_unique_ids() {
        // テスト項目: 生成される ID が重複しない
        // given (前提条件):
        let count = 1000;

        // when (操作):
        let ids: HashSet<ConnectionId> = (0..count).map(|_| ConnectionId::generate()).collect();

        // then (期待する結果):
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_generate_returns_v4_uuid() {
        // テスト項目: 生成される ID が UUID v4 である
        // when (操作):
        let id = ConnectionId::generate();

        // then (期待する結果):
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.to_string().len(), 36);
    }
}
