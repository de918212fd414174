/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX acceptor example.
//!
//! Acknowledges every NewOrderSingle with a new-order ExecutionReport and
//! rejects orders without a symbol.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ferrofix_core::{Message, MsgType, tags};
use ferrofix_engine::{
    AcceptAll, Application, BusinessReject, BusinessRejectReason, Engine, StaticCredentials,
};
use ferrofix_session::SessionId;
use tokio::net::TcpListener;
use tracing::info;

mod common;
use common::{ExampleConfig, init_logging};

#[derive(Default)]
struct OrderDesk {
    next_order_id: AtomicU64,
}

#[async_trait]
impl Application for OrderDesk {
    async fn on_logon(&self, session_id: &SessionId) {
        info!(session = %session_id, "client logged on");
    }

    async fn on_logout(&self, session_id: &SessionId) {
        info!(session = %session_id, "client logged out");
    }

    async fn on_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<Vec<Message>, BusinessReject> {
        match message.msg_type() {
            Some(MsgType::NewOrderSingle) => {
                let cl_ord_id = message.get_str(tags::CL_ORD_ID).unwrap_or("0");
                let Some(symbol) = message.get_str(tags::SYMBOL) else {
                    return Err(BusinessReject::new(
                        BusinessRejectReason::ConditionallyRequiredFieldMissing,
                    )
                    .with_ref_id(cl_ord_id)
                    .with_text("Symbol is required"));
                };
                let order_id = self.next_order_id.fetch_add(1, Ordering::Relaxed) + 1;
                info!(session = %session_id, cl_ord_id, symbol, order_id, "order accepted");

                let mut report = Message::new(MsgType::ExecutionReport);
                report
                    .add_str(tags::ORDER_ID, format!("ORD{order_id}"))
                    .add_str(tags::CL_ORD_ID, cl_ord_id)
                    .add_str(tags::EXEC_ID, format!("EX{order_id}"))
                    .add_char(tags::EXEC_TYPE, '0')
                    .add_char(tags::ORD_STATUS, '0')
                    .add_str(tags::SYMBOL, symbol)
                    .add_char(tags::SIDE, message.get_char(tags::SIDE).unwrap_or('1'))
                    .add_int(tags::LEAVES_QTY, message.get_int(tags::ORDER_QTY).unwrap_or(0))
                    .add_int(tags::CUM_QTY, 0)
                    .add_int(tags::AVG_PX, 0);
                Ok(vec![report])
            }
            other => {
                info!(session = %session_id, msg_type = ?other, "unhandled message");
                Err(BusinessReject::new(BusinessRejectReason::UnsupportedMessageType))
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::server();

    let builder = Engine::builder().with_application(OrderDesk::default());
    let builder = match (&cfg.username, &cfg.password) {
        (Some(user), Some(password)) => {
            builder.with_authenticator(StaticCredentials::new().with_user(user, password))
        }
        _ => builder.with_authenticator(AcceptAll),
    };
    let engine = builder.build()?;

    info!("Starting acceptor on {}", cfg.addr());
    let listener = TcpListener::bind(cfg.addr()).await?;
    engine.serve(listener).await?;
    Ok(())
}
