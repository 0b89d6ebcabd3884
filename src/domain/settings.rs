//! Operator settings persisted between runs.

use std::fmt;

use super::filter::AmountRange;
use super::money::Amount;

/// Dashboard login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The single settings record.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub login: String,
    pub password: String,
    pub min_amount: Option<Amount>,
    pub max_amount: Option<Amount>,
    pub is_active: bool,
    pub notify_taken: bool,
    pub chat_id: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            min_amount: None,
            max_amount: None,
            is_active: false,
            notify_taken: true,
            chat_id: None,
        }
    }
}

impl Settings {
    /// True when both login and password are filled in.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.login.is_empty() && !self.password.is_empty()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.has_credentials().then(|| Credentials {
            login: self.login.clone(),
            password: self.password.clone(),
        })
    }

    #[must_use]
    pub const fn amount_range(&self) -> AmountRange {
        AmountRange::new(self.min_amount, self.max_amount)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(login) = &patch.login {
            self.login.clone_from(login);
        }
        if let Some(password) = &patch.password {
            self.password.clone_from(password);
        }
        if let Some(min) = patch.min_amount {
            self.min_amount = min;
        }
        if let Some(max) = patch.max_amount {
            self.max_amount = max;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(notify) = patch.notify_taken {
            self.notify_taken = notify;
        }
        if let Some(chat_id) = patch.chat_id {
            self.chat_id = chat_id;
        }
    }
}

/// Partial settings update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub login: Option<String>,
    pub password: Option<String>,
    pub min_amount: Option<Option<Amount>>,
    pub max_amount: Option<Option<Amount>>,
    pub is_active: Option<bool>,
    pub notify_taken: Option<bool>,
    pub chat_id: Option<Option<i64>>,
}

impl SettingsPatch {
    #[must_use]
    pub fn credentials(credentials: Credentials) -> Self {
        Self {
            login: Some(credentials.login),
            password: Some(credentials.password),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn amount_range(range: AmountRange) -> Self {
        Self {
            min_amount: Some(range.min),
            max_amount: Some(range.max),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn notify_taken(notify_taken: bool) -> Self {
        Self {
            notify_taken: Some(notify_taken),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn chat_id(chat_id: i64) -> Self {
        Self {
            chat_id: Some(Some(chat_id)),
            ..Self::default()
        }
    }
}
