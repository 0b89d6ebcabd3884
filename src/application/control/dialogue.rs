//! Per-chat multi-step input flows.

use dashmap::DashMap;

use crate::domain::{parse_amount_input, Amount, AmountRange, Credentials};

/// Where a chat is in one of the settings flows.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialogue {
    CredentialsLogin,
    CredentialsPassword { login: String },
    CredentialsConfirm { credentials: Credentials },
    FiltersMin,
    FiltersMax { min: Option<Amount> },
    FiltersConfirm { range: AmountRange },
}

/// Result of feeding a text message to a dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Accepted; move to the next step.
    Next(Dialogue),
    /// Rejected; ask again.
    Invalid,
    /// The step does not take text.
    Ignored,
}

impl Dialogue {
    pub fn accept(&self, text: &str) -> Input {
        let text = text.trim();
        match self {
            Self::CredentialsLogin => {
                if text.is_empty() || !text.contains('@') {
                    return Input::Invalid;
                }
                Input::Next(Self::CredentialsPassword {
                    login: text.to_string(),
                })
            }
            Self::CredentialsPassword { login } => {
                if text.is_empty() {
                    return Input::Invalid;
                }
                Input::Next(Self::CredentialsConfirm {
                    credentials: Credentials {
                        login: login.clone(),
                        password: text.to_string(),
                    },
                })
            }
            Self::FiltersMin => match parse_amount_input(text) {
                Ok(min) => Input::Next(Self::FiltersMax { min }),
                Err(_) => Input::Invalid,
            },
            Self::FiltersMax { min } => match parse_amount_input(text) {
                Ok(max) => Input::Next(Self::FiltersConfirm {
                    range: AmountRange::new(*min, max),
                }),
                Err(_) => Input::Invalid,
            },
            Self::CredentialsConfirm { .. } | Self::FiltersConfirm { .. } => Input::Ignored,
        }
    }
}

/// Dialogue state keyed by chat id.
#[derive(Debug, Default)]
pub struct DialogueStore {
    chats: DashMap<i64, Dialogue>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: i64) -> Option<Dialogue> {
        self.chats.get(&chat_id).map(|entry| entry.value().clone())
    }

    pub fn set(&self, chat_id: i64, dialogue: Dialogue) {
        self.chats.insert(chat_id, dialogue);
    }

    pub fn clear(&self, chat_id: i64) {
        self.chats.remove(&chat_id);
    }

    /// Remove and return the dialogue if it matches `pred`.
    pub fn take_if(&self, chat_id: i64, pred: impl FnOnce(&Dialogue) -> bool) -> Option<Dialogue> {
        self.chats
            .remove_if(&chat_id, |_, dialogue| pred(dialogue))
            .map(|(_, dialogue)| dialogue)
    }
}
