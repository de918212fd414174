/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX initiator example.
//!
//! Logs on, sends one NewOrderSingle, waits for the ExecutionReport and
//! logs out.

use std::time::Duration;

use async_trait::async_trait;
use ferrofix_core::{Message, MsgType, tags};
use ferrofix_engine::{Application, BusinessReject, Engine};
use ferrofix_session::{SessionId, SessionSettings};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

mod common;
use common::{ExampleConfig, init_logging};

const FIX_VERSION: &str = "FIX.4.4";

/// Forwards session events to `main`.
struct Client {
    events: mpsc::UnboundedSender<Message>,
    logged_on: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl Application for Client {
    async fn on_logon(&self, session_id: &SessionId) {
        info!(session = %session_id, "logged on");
        let _ = self.logged_on.send(());
    }

    async fn on_logout(&self, session_id: &SessionId) {
        info!(session = %session_id, "logged out");
    }

    async fn on_message(
        &self,
        _session_id: &SessionId,
        message: &Message,
    ) -> Result<Vec<Message>, BusinessReject> {
        let _ = self.events.send(message.clone());
        Ok(Vec::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::client();

    let mut settings = SessionSettings::new(FIX_VERSION, &cfg.sender_comp_id, &cfg.target_comp_id)
        .with_heartbeat_interval(Duration::from_secs(cfg.heartbeat_interval))
        .with_reset_on_logon(true);
    if let (Some(user), Some(password)) = (&cfg.username, &cfg.password) {
        settings = settings.with_credentials(user, password);
    }

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let (logon_tx, mut logged_on) = mpsc::unbounded_channel();
    let engine = Engine::builder()
        .with_application(Client {
            events: events_tx,
            logged_on: logon_tx,
        })
        .with_session(settings)
        .build()?;

    info!("{} initiator connecting to {}", FIX_VERSION, cfg.addr());
    let connection = engine.connect(cfg.addr()).await?;
    if timeout(Duration::from_secs(10), logged_on.recv()).await.is_err() {
        warn!("Logon was not acknowledged");
        connection.task.abort();
        return Ok(());
    }

    let mut order = Message::new(MsgType::NewOrderSingle);
    order
        .add_str(tags::CL_ORD_ID, "1")
        .add_str(tags::SYMBOL, "AAPL")
        .add_char(tags::SIDE, '1')
        .add_int(tags::ORDER_QTY, 100)
        .add_char(tags::ORD_TYPE, '1');
    connection.sender.send(order).await?;

    match timeout(Duration::from_secs(10), events.recv()).await {
        Ok(Some(reply)) => info!(
            msg_type = ?reply.msg_type(),
            order_id = ?reply.get_str(tags::ORDER_ID),
            text = ?reply.get_str(tags::TEXT),
            "reply received"
        ),
        _ => warn!("no reply to the order"),
    }

    let mut logout = Message::new(MsgType::Logout);
    logout.add_str(tags::TEXT, "done");
    connection.sender.send(logout).await?;
    timeout(Duration::from_secs(10), connection.task).await???;
    Ok(())
}
