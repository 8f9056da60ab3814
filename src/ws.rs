use crate::client::Client;
use crate::hub::Hub;
use crate::identity::ProfileDirectory;
use crate::session::{PlayerAction, Reply, Request as SessionRequest, SessionManager, SessionToken};
use futures_util::{select, FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

/// Everything a connection needs to reach.
pub struct Context {
    pub sessions: SessionManager,
    pub hub: Arc<Hub>,
    pub profiles: Arc<ProfileDirectory>,
}

#[derive(Error, Debug)]
enum WsError {
    #[error("violation of the application-layer protocol")]
    ProtocolError,
    #[error("say hello before doing anything else")]
    Anonymous,
    #[error("{0}")]
    Identity(#[from] crate::error::IdentityError),
    #[error("{0}")]
    Session(#[from] crate::error::SessionError),
}

pub async fn accept_connection(stream: TcpStream, ctx: &'static Context) {
    log::info!("Accepted new connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, read) = stream.split();
    let mut read = read.fuse();

    let mut client = Client::new(ctx.hub.clone(), ctx.profiles.clone());

    loop {
        select! {
            msg = read.try_next() => {
                let Ok(Some(msg)) = msg else {
                    break;
                };
                let Message::Text(msg) = msg else {
                    continue;
                };
                let Ok(msg) = serde_json::from_str::<Value>(&msg) else {
                    log::error!("Invalid JSON received: {}", &msg);
                    break;
                };
                let reply = match parse_request(&msg) {
                    Ok(req) => process_request(req, &mut client, ctx).await,
                    Err(err) => {
                        log::debug!("Invalid message received: {}", &msg);
                        Err(err)
                    }
                };
                let reply = match reply {
                    Ok(Some(reply)) => reply,
                    Ok(None) => continue,
                    Err(err) => json!({
                        "type": "error",
                        "error": err.to_string()
                    }),
                };
                if write.send(Message::Text(reply.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            },
            msg = client.next_message().fuse() => {
                if write.send(Message::Text(msg.to_string())).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }

    log::info!("Connection closed");
}

/// A message sent by a chat client to the server.
enum Request {
    Hello {
        user: String,
        display_name: String,
        real_name: String,
    },
    Subscribe {
        channel: String,
    },
    NewGame {
        channel: String,
        force: bool,
        bot_token: Option<String>,
    },
    Action {
        channel: String,
        session: SessionToken,
        action: PlayerAction,
    },
}

fn field(req: &Value, name: &str) -> Result<String, WsError> {
    req[name]
        .as_str()
        .map(|s| s.to_string())
        .ok_or(WsError::ProtocolError)
}

/// Parses a websockets message from the client.
fn parse_request(req: &Value) -> Result<Request, WsError> {
    match req["type"].as_str().unwrap_or("") {
        "hello" => Ok(Request::Hello {
            user: field(req, "userId")?,
            display_name: field(req, "displayName")?,
            real_name: req["realName"].as_str().unwrap_or("").to_string(),
        }),
        "subscribe" => Ok(Request::Subscribe {
            channel: field(req, "channel")?,
        }),
        "new_game" => Ok(Request::NewGame {
            channel: field(req, "channel")?,
            force: req["force"].as_bool().unwrap_or(false),
            bot_token: req["botToken"].as_str().map(|s| s.to_string()),
        }),
        "action" => {
            let session = field(req, "session")?
                .parse()
                .map_err(|_| WsError::ProtocolError)?;
            let action = req["action"].as_str().unwrap_or("");
            let value = req["value"].as_str().unwrap_or("");
            Ok(Request::Action {
                channel: field(req, "channel")?,
                session,
                action: PlayerAction::parse(action, value).ok_or(WsError::ProtocolError)?,
            })
        }
        _ => Err(WsError::ProtocolError),
    }
}

/// Processes a request from the client, returning the direct reply, if any.
async fn process_request(req: Request, client: &mut Client, ctx: &Context) -> Result<Option<Value>, WsError> {
    let request = match req {
        Request::Hello {
            user,
            display_name,
            real_name,
        } => {
            client.hello(&user, &display_name, &real_name)?;
            return Ok(Some(json!({ "type": "welcome", "userId": user })));
        }
        Request::Subscribe { channel } => {
            client.subscribe(&channel);
            return Ok(None);
        }
        Request::NewGame {
            channel,
            force,
            bot_token,
        } => {
            let user = client.user().ok_or(WsError::Anonymous)?.to_string();
            client.subscribe(&channel);
            SessionRequest::NewGame {
                channel,
                user,
                force,
                bot_token,
            }
        }
        Request::Action {
            channel,
            session,
            action,
        } => {
            let user = client.user().ok_or(WsError::Anonymous)?.to_string();
            SessionRequest::Action {
                channel,
                user,
                session,
                action,
            }
        }
    };

    match ctx.sessions.handle(request).await? {
        Reply::Rejected(message) => Ok(Some(json!({ "type": "rejected", "message": message }))),
        Reply::Applied | Reply::Retracted | Reply::Ignored => Ok(None),
    }
}
