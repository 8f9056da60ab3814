use crate::game::notice::{Notice, Prompt, Recipient};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};

/// Delivers what a game has to say to the people playing it.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn notify_channel(&self, channel: &str, text: &str, prompt: Option<&Prompt>);

    async fn notify_player(&self, channel: &str, player: &str, text: &str);

    async fn update_pinned_status(&self, channel: &str, text: &str);

    async fn request_choice(&self, channel: &str, player: &str, text: &str, prompt: &Prompt);

    /// Tells a player to remove a prompt that is no longer current.
    async fn retract(&self, channel: &str, player: &str, session: &str);

    /// Routes a queued notice to the matching call.
    async fn deliver(&self, channel: &str, notice: &Notice) {
        match (&notice.to, &notice.prompt) {
            (Recipient::Channel, prompt) => self.notify_channel(channel, &notice.text, prompt.as_ref()).await,
            (Recipient::Player(player), Some(prompt)) => {
                self.request_choice(channel, player, &notice.text, prompt).await
            }
            (Recipient::Player(player), None) => self.notify_player(channel, player, &notice.text).await,
            (Recipient::Status, _) => self.update_pinned_status(channel, &notice.text).await,
        }
    }
}

const CHANNEL_CAPACITY: usize = 64;

/// Fans messages out to websocket clients: one broadcast per chat channel, one mailbox per user.
#[derive(Default)]
pub struct Hub {
    channels: DashMap<String, broadcast::Sender<Value>>,
    mailboxes: DashMap<String, mpsc::UnboundedSender<Value>>,
}

impl Hub {
    /// Subscribes to everything said publicly in a channel.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Value> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Opens the private mailbox of a user, replacing any previous connection's.
    ///
    /// The returned sender identifies this registration when it is later closed.
    pub fn register(&self, user: &str) -> (mpsc::UnboundedSender<Value>, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.mailboxes.insert(user.to_string(), tx.clone());
        (tx, rx)
    }

    /// Closes a user's mailbox, unless a newer connection has since replaced it.
    pub fn unregister(&self, user: &str, mailbox: &mpsc::UnboundedSender<Value>) {
        self.mailboxes.remove_if(user, |_, tx| tx.same_channel(mailbox));
    }

    fn broadcast(&self, channel: &str, msg: Value) {
        if let Some(tx) = self.channels.get(channel) {
            // Nobody listening is not an error
            tx.send(msg).ok();
        }
    }

    fn send_to(&self, user: &str, msg: Value) {
        let Some(tx) = self.mailboxes.get(user) else {
            log::debug!("No mailbox for {}; dropping message", user);
            return;
        };
        if tx.send(msg).is_err() {
            let closed = tx.clone();
            drop(tx);
            self.mailboxes.remove_if(user, |_, tx| tx.same_channel(&closed));
        }
    }
}

#[async_trait]
impl Messenger for Hub {
    async fn notify_channel(&self, channel: &str, text: &str, prompt: Option<&Prompt>) {
        self.broadcast(
            channel,
            json!({
                "type": "channel",
                "channel": channel,
                "text": text,
                "prompt": prompt
            }),
        );
    }

    async fn notify_player(&self, channel: &str, player: &str, text: &str) {
        self.send_to(
            player,
            json!({
                "type": "private",
                "channel": channel,
                "text": text
            }),
        );
    }

    async fn update_pinned_status(&self, channel: &str, text: &str) {
        self.broadcast(
            channel,
            json!({
                "type": "status",
                "channel": channel,
                "text": text
            }),
        );
    }

    async fn request_choice(&self, channel: &str, player: &str, text: &str, prompt: &Prompt) {
        self.send_to(
            player,
            json!({
                "type": "prompt",
                "channel": channel,
                "text": text,
                "prompt": prompt
            }),
        );
    }

    async fn retract(&self, channel: &str, player: &str, session: &str) {
        self.send_to(
            player,
            json!({
                "type": "retract",
                "channel": channel,
                "session": session
            }),
        );
    }
}
