pub mod chat;
pub mod link;
pub mod reminder;
pub mod stats;
