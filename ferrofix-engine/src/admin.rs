/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Administrative message builders.
//!
//! Every builder returns an unstamped message; the session fills in the
//! header before it is sent.

use crate::application::BusinessReject;
use ferrofix_core::{Message, MsgType, tags};

/// Logon (35=A) with EncryptMethod=0 and HeartBtInt.
#[must_use]
pub fn logon(heartbeat_secs: i64, reset_seq_num: bool) -> Message {
    let mut msg = Message::new(MsgType::Logon);
    msg.add_int(tags::ENCRYPT_METHOD, 0)
        .add_int(tags::HEART_BT_INT, heartbeat_secs);
    if reset_seq_num {
        msg.add_bool(tags::RESET_SEQ_NUM_FLAG, true);
    }
    msg
}

/// Logout (35=5), optionally with Text.
#[must_use]
pub fn logout(text: Option<&str>) -> Message {
    let mut msg = Message::new(MsgType::Logout);
    if let Some(text) = text {
        msg.add_str(tags::TEXT, text);
    }
    msg
}

/// Heartbeat (35=0), echoing TestReqID when answering a TestRequest.
#[must_use]
pub fn heartbeat(test_req_id: Option<&str>) -> Message {
    let mut msg = Message::new(MsgType::Heartbeat);
    if let Some(id) = test_req_id {
        msg.add_str(tags::TEST_REQ_ID, id);
    }
    msg
}

/// TestRequest (35=1).
#[must_use]
pub fn test_request(test_req_id: &str) -> Message {
    let mut msg = Message::new(MsgType::TestRequest);
    msg.add_str(tags::TEST_REQ_ID, test_req_id);
    msg
}

/// ResendRequest (35=2) for `[begin, end]`.
#[must_use]
pub fn resend_request(begin: u32, end: u32) -> Message {
    let mut msg = Message::new(MsgType::ResendRequest);
    msg.add_int(tags::BEGIN_SEQ_NO, i64::from(begin))
        .add_int(tags::END_SEQ_NO, i64::from(end));
    msg
}

/// BusinessMessageReject (35=j) for the message `ref_seq_num` of type
/// `ref_msg_type`.
#[must_use]
pub fn business_message_reject(
    ref_seq_num: Option<u32>,
    ref_msg_type: &str,
    reject: &BusinessReject,
) -> Message {
    let mut msg = Message::new(MsgType::BusinessMessageReject);
    if let Some(seq) = ref_seq_num {
        msg.add_int(tags::REF_SEQ_NUM, i64::from(seq));
    }
    msg.add_str(tags::REF_MSG_TYPE, ref_msg_type);
    if let Some(ref_id) = &reject.ref_id {
        msg.add_str(tags::BUSINESS_REJECT_REF_ID, ref_id.as_str());
    }
    msg.add_int(tags::BUSINESS_REJECT_REASON, reject.reason.code());
    if let Some(text) = &reject.text {
        msg.add_str(tags::TEXT, text.as_str());
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BusinessRejectReason;

    #[test]
    fn test_logon() {
        let msg = logon(30, false);
        assert_eq!(msg.msg_type(), Some(&MsgType::Logon));
        assert_eq!(msg.get_int(tags::ENCRYPT_METHOD), Some(0));
        assert_eq!(msg.get_int(tags::HEART_BT_INT), Some(30));
        assert!(!msg.contains(tags::RESET_SEQ_NUM_FLAG));
        assert_eq!(logon(10, true).get_bool(tags::RESET_SEQ_NUM_FLAG), Some(true));
    }

    #[test]
    fn test_resend_request() {
        let msg = resend_request(1, 2);
        assert_eq!(msg.get_int(tags::BEGIN_SEQ_NO), Some(1));
        assert_eq!(msg.get_int(tags::END_SEQ_NO), Some(2));
    }

    #[test]
    fn test_business_message_reject_layout() {
        let reject = BusinessReject::new(BusinessRejectReason::UnknownSecurity)
            .with_text("unknown symbol");
        let msg = business_message_reject(Some(7), "D", &reject);
        let fields: Vec<u32> = msg.fields_in_order().into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(fields, vec![45, 372, 380, 58]);
        assert_eq!(msg.get_int(tags::BUSINESS_REJECT_REASON), Some(2));
        assert_eq!(msg.get_str(tags::REF_MSG_TYPE), Some("D"));
    }

    #[test]
    fn test_heartbeat_and_logout() {
        assert_eq!(heartbeat(Some("T1")).get_str(tags::TEST_REQ_ID), Some("T1"));
        assert!(heartbeat(None).body().is_empty());
        assert_eq!(logout(Some("bye")).get_str(tags::TEXT), Some("bye"));
        assert_eq!(test_request("X").get_str(tags::TEST_REQ_ID), Some("X"));
    }
}
