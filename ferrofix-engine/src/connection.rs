/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Drives one connection: bytes in, handler, actions out.

use crate::handler::{Action, ProtocolHandler};
use ferrofix_core::Message;
use ferrofix_transport::{FixCodec, TransportError};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Close,
}

/// Runs `handler` over `io` until either side closes.
///
/// Decoded messages go to [`ProtocolHandler::on_message`]; messages received
/// on `outbound` are stamped with [`ProtocolHandler::stamp`] and sent. A
/// message that fails to decode or encode is logged and skipped.
/// [`ProtocolHandler::on_disconnected`] is always called before returning.
///
/// # Errors
/// I/O failures and oversized fields.
pub async fn run_connection<T, H>(
    io: T,
    codec: FixCodec,
    handler: &mut H,
    mut outbound: mpsc::Receiver<Message>,
) -> Result<(), TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
    H: ProtocolHandler + ?Sized,
{
    let mut framed = Framed::new(io, codec);
    let result = drive(&mut framed, handler, &mut outbound).await;
    handler.on_disconnected().await;
    if let Err(err) = &result {
        warn!(session = ?handler.session_id(), error = %err, "connection failed");
    } else {
        info!(session = ?handler.session_id(), "connection closed");
    }
    result
}

async fn drive<T, H>(
    framed: &mut Framed<T, FixCodec>,
    handler: &mut H,
    outbound: &mut mpsc::Receiver<Message>,
) -> Result<(), TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
    H: ProtocolHandler + ?Sized,
{
    let actions = handler.on_connected().await;
    if execute(framed, actions).await? == Flow::Close {
        return Ok(());
    }

    loop {
        tokio::select! {
            inbound = framed.next() => match inbound {
                None => {
                    debug!("peer closed the stream");
                    return Ok(());
                }
                Some(Err(err)) => return Err(err),
                Some(Ok(Err(err))) => {
                    warn!(error = %err, "discarding undecodable message");
                }
                Some(Ok(Ok(message))) => {
                    let actions = handler.on_message(message).await;
                    if execute(framed, actions).await? == Flow::Close {
                        return Ok(());
                    }
                }
            },
            Some(mut message) = outbound.recv() => {
                match handler.stamp(&mut message) {
                    Ok(_) => {
                        send(framed, message).await?;
                        framed.flush().await?;
                    }
                    Err(err) => {
                        warn!(error = %err, msg_type = ?message.msg_type(), "dropping outbound message");
                    }
                }
            }
        }
    }
}

async fn execute<T>(framed: &mut Framed<T, FixCodec>, actions: Vec<Action>) -> Result<Flow, TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut flow = Flow::Continue;
    for action in actions {
        match action {
            Action::Send(message) => send(framed, message).await?,
            Action::Disconnect(reason) => {
                debug!(%reason, "disconnect requested");
                flow = Flow::Close;
                break;
            }
        }
    }
    framed.flush().await?;
    Ok(flow)
}

/// Buffers `message`. Encode failures lose that message only.
async fn send<T>(framed: &mut Framed<T, FixCodec>, message: Message) -> Result<(), TransportError>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    match framed.feed(message).await {
        Err(TransportError::Encode(err)) => {
            warn!(error = %err, "failed to encode outbound message");
            Ok(())
        }
        other => other,
    }
}
