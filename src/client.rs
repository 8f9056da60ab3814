use crate::error::IdentityError;
use crate::hub::Hub;
use crate::identity::ProfileDirectory;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// A single websocket client: one chat user, listening to any number of channels.
pub struct Client {
    hub: Arc<Hub>,
    profiles: Arc<ProfileDirectory>,
    user: Option<String>,
    /// The sender of our registered mailbox, identifying it to the hub.
    mailbox: Option<mpsc::UnboundedSender<Value>>,
    outbox: mpsc::UnboundedSender<Value>,
    inbox: mpsc::UnboundedReceiver<Value>,
    channels: Vec<String>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Client {
    pub fn new(hub: Arc<Hub>, profiles: Arc<ProfileDirectory>) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        Self {
            hub,
            profiles,
            user: None,
            mailbox: None,
            outbox,
            inbox,
            channels: vec![],
            forwarders: vec![],
        }
    }

    /// The user this client speaks for, once it has said hello.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Identifies the client as a user and opens their private mailbox.
    pub fn hello(&mut self, user: &str, display_name: &str, real_name: &str) -> Result<(), IdentityError> {
        self.profiles.register(user, display_name, real_name)?;
        self.close_mailbox();
        self.user = Some(user.to_string());

        let (tx, mut mailbox) = self.hub.register(user);
        self.mailbox = Some(tx);
        let outbox = self.outbox.clone();
        self.forwarders.push(tokio::spawn(async move {
            while let Some(msg) = mailbox.recv().await {
                if outbox.send(msg).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    /// Starts listening to a channel.
    pub fn subscribe(&mut self, channel: &str) {
        if self.channels.iter().any(|c| c == channel) {
            return;
        }
        self.channels.push(channel.to_string());

        let mut updates = self.hub.subscribe(channel);
        let outbox = self.outbox.clone();
        self.forwarders.push(tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(msg) => {
                        if outbox.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Client lagged behind by {} messages", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    fn close_mailbox(&mut self) {
        if let (Some(user), Some(tx)) = (&self.user, self.mailbox.take()) {
            self.hub.unregister(user, &tx);
        }
    }

    /// Waits until there is something to send to the client.
    pub async fn next_message(&mut self) -> Value {
        match self.inbox.recv().await {
            Some(msg) => msg,
            // Unreachable while we hold `outbox`
            None => std::future::pending().await,
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        self.close_mailbox();
    }
}
