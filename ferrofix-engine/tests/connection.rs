/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Acceptor driven over an in-memory stream.

use ferrofix_core::{Message, MsgType, tags};
use ferrofix_engine::{AcceptorHandler, EngineContext, NoOpApplication, run_connection};
use ferrofix_session::SessionId;
use ferrofix_transport::FixCodec;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::Framed;

fn client_message(msg_type: MsgType, seq: u32) -> Message {
    let mut message = Message::new(msg_type);
    let header = message.header_mut();
    header.begin_string = "FIX.4.4".to_string();
    header.sender_comp_id = "CLIENT".to_string();
    header.target_comp_id = "SERVER".to_string();
    header.msg_seq_num = Some(seq);
    message
}

async fn next_message(client: &mut Framed<DuplexStream, FixCodec>) -> Message {
    timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for a message")
        .expect("stream ended")
        .expect("transport error")
        .expect("decode error")
}

#[tokio::test]
async fn test_acceptor_over_stream() {
    let context = EngineContext::new(Arc::new(NoOpApplication));
    let repository = context.repository.clone();
    let outbound = context.outbound.clone();
    let (client_io, server_io) = tokio::io::duplex(4096);

    let (tx, rx) = mpsc::channel(16);
    let mut handler = AcceptorHandler::new(context).with_outbound(tx);
    let server = tokio::spawn(async move {
        run_connection(server_io, FixCodec::new(), &mut handler, rx).await
    });

    let mut client = Framed::new(client_io, FixCodec::new());
    let mut logon = client_message(MsgType::Logon, 1);
    logon.add_int(tags::ENCRYPT_METHOD, 0).add_int(tags::HEART_BT_INT, 10);
    client.send(logon).await.unwrap();

    let ack = next_message(&mut client).await;
    assert_eq!(ack.msg_type(), Some(&MsgType::Logon));
    assert_eq!(ack.get_int(tags::HEART_BT_INT), Some(10));
    assert_eq!(ack.msg_seq_num(), Some(1));

    let id = SessionId::new("SERVER", "CLIENT");
    assert!(repository.contains(&id));
    let sender = outbound.get(&id).expect("session sender registered");
    let mut news = Message::new(MsgType::News);
    news.add_str(tags::TEXT, "hello");
    sender.send(news).await.unwrap();

    let pushed = next_message(&mut client).await;
    assert_eq!(pushed.msg_type(), Some(&MsgType::News));
    assert_eq!(pushed.msg_seq_num(), Some(2));
    assert_eq!(pushed.header().sender_comp_id, "SERVER");

    client.send(client_message(MsgType::Logout, 2)).await.unwrap();
    let reply = next_message(&mut client).await;
    assert_eq!(reply.msg_type(), Some(&MsgType::Logout));

    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(repository.is_empty());
    assert!(outbound.get(&id).is_none());
}

#[tokio::test]
async fn test_corrupt_message_is_skipped() {
    let context = EngineContext::new(Arc::new(NoOpApplication));
    let (client_io, server_io) = tokio::io::duplex(4096);
    let (_tx, rx) = mpsc::channel(1);
    let mut handler = AcceptorHandler::new(context);
    let server = tokio::spawn(async move {
        run_connection(server_io, FixCodec::new(), &mut handler, rx).await
    });

    let mut client = Framed::new(client_io, FixCodec::new());
    client
        .get_mut()
        .write_all(b"8=FIX.4.4\x019=5\x0135=A\x0110=000\x01")
        .await
        .unwrap();
    let mut logon = client_message(MsgType::Logon, 1);
    logon.add_int(tags::HEART_BT_INT, 30);
    client.send(logon).await.unwrap();

    let ack = next_message(&mut client).await;
    assert_eq!(ack.msg_type(), Some(&MsgType::Logon));

    drop(client);
    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_non_logon_first_closes_connection() {
    let context = EngineContext::new(Arc::new(NoOpApplication));
    let (client_io, server_io) = tokio::io::duplex(4096);
    let (_tx, rx) = mpsc::channel(1);
    let mut handler = AcceptorHandler::new(context);
    let server = tokio::spawn(async move {
        run_connection(server_io, FixCodec::new(), &mut handler, rx).await
    });

    let mut client = Framed::new(client_io, FixCodec::new());
    client.send(client_message(MsgType::Heartbeat, 1)).await.unwrap();

    timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let next = timeout(Duration::from_secs(5), client.next()).await.unwrap();
    assert!(next.is_none());
}
