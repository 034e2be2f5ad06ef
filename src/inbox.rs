//! Unread message queue.

use heapless::Deque;

use crate::config::UNREAD_CAPACITY;
use crate::text::{Name, Text};

/// A received message awaiting the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub from: Name,
    pub body: Text,
}

impl Message {
    pub fn new(from: Name, body: Text) -> Self {
        Self { from, body }
    }
}

/// FIFO of unread messages; the oldest entry is evicted when full.
#[derive(Default)]
pub struct UnreadQueue {
    messages: Deque<Message, UNREAD_CAPACITY>,
}

impl UnreadQueue {
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
        }
    }

    pub fn push(&mut self, message: Message) {
        if self.messages.is_full() {
            if let Some(dropped) = self.messages.pop_front() {
                warn!("inbox: full, dropping message from {}", dropped.from.as_str());
            }
        }
        // Cannot fail after the eviction above.
        let _ = self.messages.push_back(message);
    }

    /// Queue `message` only if there is room, handing it back otherwise.
    pub fn try_push(&mut self, message: Message) -> Result<(), Message> {
        self.messages.push_back(message)
    }

    pub fn oldest(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn pop_oldest(&mut self) -> Option<Message> {
        self.messages.pop_front()
    }

    /// Remove the most recently pushed message.
    pub fn take_newest(&mut self) -> Option<Message> {
        self.messages.pop_back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::truncated;

    fn msg(from: &str, body: &str) -> Message {
        Message::new(truncated(from), truncated(body))
    }

    #[test]
    fn pops_in_arrival_order() {
        let mut q = UnreadQueue::new();
        q.push(msg("Bob", "one"));
        q.push(msg("Ann", "two"));
        assert_eq!(q.pop_oldest(), Some(msg("Bob", "one")));
        assert_eq!(q.pop_oldest(), Some(msg("Ann", "two")));
        assert_eq!(q.pop_oldest(), None);
    }

    #[test]
    fn take_newest_undoes_last_push() {
        let mut q = UnreadQueue::new();
        q.push(msg("Bob", "one"));
        q.push(msg("Ann", "Tea?"));
        assert_eq!(q.take_newest(), Some(msg("Ann", "Tea?")));
        assert_eq!(q.len(), 1);
        assert_eq!(q.oldest(), Some(&msg("Bob", "one")));
    }

    #[test]
    fn full_queue_evicts_oldest() {
        let mut q = UnreadQueue::new();
        for i in 0..=UNREAD_CAPACITY {
            q.push(msg("Bob", &i.to_string()));
        }
        assert_eq!(q.len(), UNREAD_CAPACITY);
        assert_eq!(q.oldest().map(|m| m.body.as_str()), Some("1"));
        assert_eq!(q.take_newest().map(|m| m.body), Some(truncated("16")));
    }

    #[test]
    fn try_push_never_evicts() {
        let mut q = UnreadQueue::new();
        for i in 0..UNREAD_CAPACITY {
            q.try_push(msg("Bob", &i.to_string())).unwrap();
        }
        assert_eq!(q.try_push(msg("Ann", "Tea?")), Err(msg("Ann", "Tea?")));
        assert_eq!(q.len(), UNREAD_CAPACITY);
        assert_eq!(q.oldest().map(|m| m.body.as_str()), Some("0"));
    }
}
