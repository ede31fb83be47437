use crate::types::{ActiveUser, Message, MessageId, Role, SendMessageRequest, UserId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientEvent {
    SendMessage(SendMessageRequest),
    #[serde(rename_all = "camelCase")]
    MarkAsRead { message_id: MessageId },
    #[serde(rename_all = "camelCase")]
    TypingStart { to_user_id: UserId },
    #[serde(rename_all = "camelCase")]
    TypingStop { to_user_id: UserId },
    #[serde(rename_all = "camelCase")]
    LoadHistory { target_user_id: UserId },
    GetActiveUsers,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerEvent {
    UserOnline {
        id: UserId,
        name: String,
        role: Role,
    },
    UserOffline {
        id: UserId,
    },
    MessageSent(Message),
    #[serde(rename_all = "camelCase")]
    MessageDelivered {
        message_id: MessageId,
        delivered_at: u64,
    },
    ReceiveMessage(Message),
    UploadError {
        message: String,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    MessageRead {
        message_id: MessageId,
        read_at: u64,
    },
    #[serde(rename_all = "camelCase")]
    UserTyping {
        from_user_id: UserId,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    UserStoppedTyping {
        from_user_id: UserId,
    },
    ChatHistory(Vec<Message>),
    ActiveUsersList(Vec<ActiveUser>),
    Error {
        message: String,
    },
}
