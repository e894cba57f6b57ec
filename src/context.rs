//! Per-channel conversation memory for LLM context
//!
//! Keeps a bounded history of user/assistant turns per channel and formats
//! them for chat-completion requests.

use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageArgs,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
struct Turn {
    role: Role,
    content: String,
}

pub struct ConversationStore {
    capacity: usize,
    channels: Mutex<HashMap<u64, VecDeque<Turn>>>,
}

impl ConversationStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Record a user turn, attributed so multi-user channels stay readable
    /// in the model's context.
    pub fn push_user(&self, channel_id: u64, author: &str, content: &str) {
        self.push(channel_id, Role::User, format!("[{}]: {}", author, content));
    }

    pub fn push_assistant(&self, channel_id: u64, content: &str) {
        self.push(channel_id, Role::Assistant, content.to_string());
    }

    fn push(&self, channel_id: u64, role: Role, content: String) {
        if content.trim().is_empty() {
            return;
        }
        let mut channels = self.channels.lock().unwrap();
        let history = channels.entry(channel_id).or_default();
        history.push_back(Turn { role, content });
        while history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// History for one channel formatted as chat-completion messages,
    /// oldest first.
    pub fn messages_for(&self, channel_id: u64) -> Vec<ChatCompletionRequestMessage> {
        let channels = self.channels.lock().unwrap();
        let Some(history) = channels.get(&channel_id) else {
            return Vec::new();
        };
        history
            .iter()
            .filter_map(|turn| match turn.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .ok()
                    .map(Into::into),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .ok()
                    .map(Into::into),
            })
            .collect()
    }

    pub fn clear(&self, channel_id: u64) {
        self.channels.lock().unwrap().remove(&channel_id);
    }

    /// (user turns, assistant turns) currently held for the channel.
    pub fn stats(&self, channel_id: u64) -> (usize, usize) {
        let channels = self.channels.lock().unwrap();
        let Some(history) = channels.get(&channel_id) else {
            return (0, 0);
        };
        let users = history.iter().filter(|t| t.role == Role::User).count();
        (users, history.len() - users)
    }
}
