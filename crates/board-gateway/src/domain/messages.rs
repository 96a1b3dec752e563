//! Message Store - tagged messages keyed by generated ids.

use crate::domain::error::StoreError;
use crate::domain::types::{Message, MessageId};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

struct StoredMessage {
    /// Insertion sequence, used to keep search results in creation order
    seq: u64,
    message: Message,
}

#[derive(Default)]
struct Inner {
    messages: HashMap<MessageId, StoredMessage>,
    next_seq: u64,
}

/// In-memory message store, one per process.
#[derive(Default)]
pub struct MessageStore {
    inner: RwLock<Inner>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a message and return its new id
    pub fn create(&self, message: Message) -> MessageId {
        let mut inner = self.inner.write();

        let mut id = MessageId::new();
        while inner.messages.contains_key(&id) {
            id = MessageId::new();
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        debug!(id = %id, tags = message.tags.len(), "Created message");
        inner.messages.insert(id, StoredMessage { seq, message });
        id
    }

    pub fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.inner
            .read()
            .messages
            .get(id)
            .map(|stored| stored.message.clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Live messages whose tags contain `tag`, oldest first
    pub fn search_by_tag(&self, tag: &str) -> Vec<Message> {
        let inner = self.inner.read();
        let mut hits: Vec<&StoredMessage> = inner
            .messages
            .values()
            .filter(|stored| stored.message.has_tag(tag))
            .collect();
        hits.sort_by_key(|stored| stored.seq);
        hits.into_iter().map(|stored| stored.message.clone()).collect()
    }

    pub fn delete(&self, id: &MessageId) -> Result<(), StoreError> {
        match self.inner.write().messages.remove(id) {
            Some(_) => {
                debug!(id = %id, "Deleted message");
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Number of live messages
    pub fn len(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(body: &str, tags: &[&str]) -> Message {
        Message::new(body, tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_create_get_round_trip() {
        let store = MessageStore::new();
        let id = store.create(msg("hi", &["a", "b"]));
        assert_eq!(store.get(&id).unwrap(), msg("hi", &["a", "b"]));
    }

    #[test]
    fn test_delete_then_get() {
        let store = MessageStore::new();
        let id = store.create(msg("bye", &[]));
        store.delete(&id).unwrap();
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_ids_unique() {
        let store = MessageStore::new();
        let ids: std::collections::HashSet<_> =
            (0..500).map(|i| store.create(msg(&i.to_string(), &[]))).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_search_by_tag_exact_and_ordered() {
        let store = MessageStore::new();
        store.create(msg("first", &["rust", "news"]));
        store.create(msg("second", &["news"]));
        let third = store.create(msg("third", &["rust"]));
        store.create(msg("fourth", &["rusty"]));

        let hits = store.search_by_tag("rust");
        let bodies: Vec<_> = hits.iter().filter_map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "third"]);

        store.delete(&third).unwrap();
        let hits = store.search_by_tag("rust");
        assert_eq!(hits.len(), 1);
        assert!(store.search_by_tag("missing").is_empty());
    }

    #[test]
    fn test_duplicate_tags_kept() {
        let store = MessageStore::new();
        let id = store.create(msg("dup", &["x", "x"]));
        assert_eq!(store.get(&id).unwrap().tags, vec!["x", "x"]);
        assert_eq!(store.search_by_tag("x").len(), 1);
    }
}
