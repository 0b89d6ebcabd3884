//! Chat authorization.

use std::collections::HashSet;

use tracing::warn;

/// Chats allowed to use the bot. An empty list allows every chat.
#[derive(Debug, Clone, Default)]
pub struct ChatAllowList {
    allowed: HashSet<i64>,
}

impl ChatAllowList {
    pub fn new(chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: chat_ids.into_iter().collect(),
        }
    }

    /// Check if a chat may use the bot.
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        if self.allowed.is_empty() || self.allowed.contains(&chat_id) {
            return true;
        }
        warn!(chat_id, "Ignoring Telegram update from unauthorized chat");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_allows_everyone() {
        assert!(ChatAllowList::default().is_allowed(42));
    }

    #[test]
    fn listed_chats_only() {
        let list = ChatAllowList::new([1, -100_200]);
        assert!(list.is_allowed(1));
        assert!(list.is_allowed(-100_200));
        assert!(!list.is_allowed(2));
    }
}
