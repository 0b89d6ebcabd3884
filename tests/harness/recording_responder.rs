use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ordertaker::error::Result;
use ordertaker::port::{CallbackAnswer, MessageRef, Reply, Responder};

/// Something the control layer asked the responder to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message { chat_id: i64, reply: Reply },
    Edit { message: MessageRef, reply: Reply },
    Answer { callback_id: String, answer: CallbackAnswer },
}

/// Collects replies instead of talking to Telegram.
#[derive(Clone, Default)]
pub struct RecordingResponder {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().expect("lock responder").clone()
    }

    pub fn clear(&self) {
        self.sent.lock().expect("lock responder").clear();
    }

    /// Text of the last sent or edited message.
    pub fn last_text(&self) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find_map(|sent| match sent {
                Sent::Message { reply, .. } | Sent::Edit { reply, .. } => Some(reply.text),
                Sent::Answer { .. } => None,
            })
    }

    /// Last sent or edited reply.
    pub fn last_reply(&self) -> Option<Reply> {
        self.sent()
            .into_iter()
            .rev()
            .find_map(|sent| match sent {
                Sent::Message { reply, .. } | Sent::Edit { reply, .. } => Some(reply),
                Sent::Answer { .. } => None,
            })
    }

    pub fn answers(&self) -> Vec<CallbackAnswer> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Answer { answer, .. } => Some(answer),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()> {
        self.sent
            .lock()
            .expect("lock responder")
            .push(Sent::Message { chat_id, reply });
        Ok(())
    }

    async fn edit(&self, message: MessageRef, reply: Reply) -> Result<()> {
        self.sent
            .lock()
            .expect("lock responder")
            .push(Sent::Edit { message, reply });
        Ok(())
    }

    async fn answer(&self, callback_id: &str, answer: CallbackAnswer) -> Result<()> {
        self.sent.lock().expect("lock responder").push(Sent::Answer {
            callback_id: callback_id.to_string(),
            answer,
        });
        Ok(())
    }
}
