pub mod attachments;
pub mod auth;
pub mod blob;
pub mod config;
pub mod directory;
pub mod error;
pub mod outbound;
pub mod presence;
pub mod session;
pub mod store;
pub mod time;
pub mod typing;

use attachments::{classify, normalize};
use auth::Authenticator;
use blob::BlobStore;
use config::CoreConfig;
use directory::UserDirectory;
use error::CoreError;
use huddle_api::events::{ClientEvent, ServerEvent};
use huddle_api::types::{Message, MessageId, Role, SendMessageRequest, UserId};
use huddle_api::validation::{
    validate_history_request, validate_send_request, ValidationLimits,
};
use outbound::OutboundRouter;
use presence::PresenceRegistry;
use session::{ConnectionId, ConnectionSession, SessionTable};
use std::sync::Arc;
use std::time::Duration;
use store::MessageStore;
use time::now_ms;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use typing::TypingCoordinator;
use uuid::Uuid;

/// Cheap to clone; every clone shares the same state.
#[derive(Clone)]
pub struct Core {
    config: CoreConfig,
    limits: ValidationLimits,
    auth: Arc<dyn Authenticator>,
    store: Arc<dyn MessageStore>,
    blobs: Arc<dyn BlobStore>,
    directory: Arc<dyn UserDirectory>,
    presence: Arc<PresenceRegistry>,
    sessions: Arc<Mutex<SessionTable>>,
    outbound: OutboundRouter,
    typing: TypingCoordinator,
}

impl Core {
    pub fn new(
        config: CoreConfig,
        auth: Arc<dyn Authenticator>,
        store: Arc<dyn MessageStore>,
        blobs: Arc<dyn BlobStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let presence = Arc::new(PresenceRegistry::new());
        let outbound = OutboundRouter::new();
        let typing = TypingCoordinator::new(
            presence.clone(),
            outbound.clone(),
            Duration::from_millis(config.typing_debounce_ms),
        );
        let limits = ValidationLimits {
            max_text_bytes: config.max_text_bytes,
            max_filename_len: config.max_filename_len,
        };
        Self {
            config,
            limits,
            auth,
            store,
            blobs,
            directory,
            presence,
            sessions: Arc::new(Mutex::new(SessionTable::new())),
            outbound,
            typing,
        }
    }

    pub async fn connect(
        &self,
        credential: &str,
        sender: UnboundedSender<ServerEvent>,
    ) -> Result<ConnectionId, CoreError> {
        let identity = self.auth.authenticate(credential).await?;
        let connection_id = Uuid::new_v4();
        let session = ConnectionSession {
            connection_id,
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            role: identity.role,
            connected_at: now_ms(),
        };
        self.outbound.attach(connection_id, sender).await;
        self.sessions.lock().await.insert(session);
        let first = self
            .presence
            .register(&identity.user_id, connection_id)
            .await;
        if first {
            self.broadcast_to_role(
                identity.role.complement(),
                ServerEvent::UserOnline {
                    id: identity.user_id.clone(),
                    name: identity.display_name,
                    role: identity.role,
                },
            )
            .await;
        }
        self.touch_last_seen(identity.user_id);
        Ok(connection_id)
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let session = self.sessions.lock().await.remove(connection_id);
        let Some(session) = session else {
            return;
        };
        let deregistered = self.presence.deregister(connection_id).await;
        self.typing.cancel_connection(connection_id).await;
        self.outbound.detach(connection_id).await;
        if let Some((user_id, true)) = deregistered {
            self.touch_last_seen(user_id.clone());
            self.broadcast_to_role(
                session.role.complement(),
                ServerEvent::UserOffline { id: user_id },
            )
            .await;
        }
    }

    pub async fn handle_client_event(&self, connection_id: ConnectionId, event: ClientEvent) {
        let outcome = match event {
            ClientEvent::SendMessage(request) => self.send_message(connection_id, request).await,
            ClientEvent::MarkAsRead { message_id } => {
                self.mark_read(connection_id, message_id).await
            }
            ClientEvent::TypingStart { to_user_id } => {
                self.typing_start(connection_id, to_user_id).await
            }
            ClientEvent::TypingStop { to_user_id } => {
                self.typing_stop(connection_id, to_user_id).await
            }
            ClientEvent::LoadHistory { target_user_id } => {
                self.load_history(connection_id, target_user_id).await
            }
            ClientEvent::GetActiveUsers => self.active_users(connection_id).await,
        };
        if let Err(err) = outcome {
            self.report_error(connection_id, err).await;
        }
    }

    pub async fn send_message(
        &self,
        connection_id: ConnectionId,
        request: SendMessageRequest,
    ) -> Result<(), CoreError> {
        validate_send_request(&request, &self.limits)?;
        let session = self.session(connection_id).await?;
        let attachment = match classify(&request) {
            None => None,
            Some(_) if !self.config.allow_attachments => {
                return Err(CoreError::Validation("attachments disabled".to_string()));
            }
            Some(payload) => Some(
                normalize(
                    payload,
                    request.file_type.as_deref(),
                    request.file_name.as_deref(),
                    self.blobs.as_ref(),
                )
                .await?,
            ),
        };
        let now = now_ms();
        let to_user = request.to_user_id;
        let self_message = to_user == session.user_id;
        let mut message = Message {
            id: MessageId::random(),
            from: session.user_id,
            to: to_user,
            text: request.text.unwrap_or_default(),
            from_name: session.display_name,
            from_role: session.role,
            attachment,
            timestamp: now,
            delivered_at: None,
            // A message to oneself is trivially already seen.
            read_at: self_message.then_some(now),
        };
        self.store.append(message.clone()).await?;
        let live = self.presence.live_connections(&message.to).await;
        if !live.is_empty() {
            let delivered_at = now_ms();
            self.store.mark_delivered(message.id, delivered_at).await?;
            message.delivered_at = Some(delivered_at);
            self.outbound
                .push_all(&live, ServerEvent::ReceiveMessage(message.clone()))
                .await;
            self.outbound
                .push(
                    connection_id,
                    ServerEvent::MessageDelivered {
                        message_id: message.id,
                        delivered_at,
                    },
                )
                .await;
        }
        self.outbound
            .push(connection_id, ServerEvent::MessageSent(message.clone()))
            .await;
        if self_message {
            self.outbound
                .push_all(
                    &live,
                    ServerEvent::MessageRead {
                        message_id: message.id,
                        read_at: now,
                    },
                )
                .await;
        }
        Ok(())
    }

    pub async fn mark_read(
        &self,
        connection_id: ConnectionId,
        message_id: MessageId,
    ) -> Result<(), CoreError> {
        let session = self.session(connection_id).await?;
        let message = self
            .store
            .get(message_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if message.to != session.user_id {
            return Err(CoreError::Validation(
                "message not addressed to caller".to_string(),
            ));
        }
        if message.read_at.is_some() {
            return Ok(());
        }
        let read_at = now_ms();
        self.store.mark_read(message_id, read_at).await?;
        let sender_connections = self.presence.live_connections(&message.from).await;
        self.outbound
            .push_all(
                &sender_connections,
                ServerEvent::MessageRead {
                    message_id,
                    read_at,
                },
            )
            .await;
        Ok(())
    }

    pub async fn typing_start(
        &self,
        connection_id: ConnectionId,
        to_user_id: UserId,
    ) -> Result<(), CoreError> {
        let session = self.session(connection_id).await?;
        self.typing
            .start(
                connection_id,
                session.user_id,
                session.display_name,
                to_user_id,
            )
            .await;
        Ok(())
    }

    pub async fn typing_stop(
        &self,
        connection_id: ConnectionId,
        to_user_id: UserId,
    ) -> Result<(), CoreError> {
        let session = self.session(connection_id).await?;
        self.typing
            .stop(connection_id, session.user_id, to_user_id)
            .await;
        Ok(())
    }

    pub async fn load_history(
        &self,
        connection_id: ConnectionId,
        target_user_id: UserId,
    ) -> Result<(), CoreError> {
        let session = self.session(connection_id).await?;
        validate_history_request(&session.user_id, &target_user_id)?;
        let messages = self
            .store
            .find_pair(&session.user_id, &target_user_id)
            .await?;
        self.outbound
            .push(connection_id, ServerEvent::ChatHistory(messages))
            .await;
        Ok(())
    }

    pub async fn active_users(&self, connection_id: ConnectionId) -> Result<(), CoreError> {
        let users = self.presence.list_all().await;
        self.outbound
            .push(connection_id, ServerEvent::ActiveUsersList(users))
            .await;
        Ok(())
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.presence.is_online(user_id).await
    }

    pub async fn active_users_snapshot(&self) -> Vec<huddle_api::types::ActiveUser> {
        self.presence.list_all().await
    }

    async fn session(&self, connection_id: ConnectionId) -> Result<ConnectionSession, CoreError> {
        self.sessions
            .lock()
            .await
            .get(connection_id)
            .cloned()
            .ok_or(CoreError::NotFound)
    }

    async fn broadcast_to_role(&self, role: Role, event: ServerEvent) {
        let targets = self.sessions.lock().await.connections_with_role(role);
        self.outbound.push_all(&targets, event).await;
    }

    fn touch_last_seen(&self, user_id: UserId) {
        let directory = self.directory.clone();
        tokio::spawn(async move {
            if let Err(err) = directory.touch_last_seen(&user_id, now_ms()).await {
                log::warn!("last-seen update failed for {}: {}", user_id, err);
            }
        });
    }

    async fn report_error(&self, connection_id: ConnectionId, err: CoreError) {
        let event = match err {
            CoreError::Upload(detail) => ServerEvent::UploadError {
                message: "attachment upload failed".to_string(),
                error: detail,
            },
            other => ServerEvent::Error {
                message: other.to_string(),
            },
        };
        self.outbound.push(connection_id, event).await;
    }
}

#[cfg(test)]
mod tests;
