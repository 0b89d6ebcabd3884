//! Inline button payloads.

use crate::domain::OrderSlug;

/// Actions behind inline buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    BotStart,
    BotStop,
    BotNoSettings,
    StatsShow,
    Retry(OrderSlug),
    Skip(OrderSlug),
    SettingsMenu,
    SettingsBack,
    SettingsCredentials,
    CredentialsEdit,
    CredentialsSave,
    SettingsFilters,
    FiltersEdit,
    FiltersSave,
    SettingsNotifications,
    NotifyToggle,
}

/// Parse error for callback payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackParseError {
    Unknown(String),
    MissingSlug(&'static str),
}

impl std::fmt::Display for CallbackParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(data) => write!(f, "unknown callback `{data}`"),
            Self::MissingSlug(action) => write!(f, "`{action}` callback without order id"),
        }
    }
}

impl std::error::Error for CallbackParseError {}

impl Callback {
    /// Parse a callback payload.
    ///
    /// `settings:open` and `settings:cancel` are older spellings of
    /// `settings:menu` still present on previously sent keyboards.
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        if let Some(slug) = data.strip_prefix("retry:") {
            return slug_arg(slug, "retry").map(Self::Retry);
        }
        if let Some(slug) = data.strip_prefix("skip:") {
            return slug_arg(slug, "skip").map(Self::Skip);
        }

        match data {
            "bot:start" => Ok(Self::BotStart),
            "bot:stop" => Ok(Self::BotStop),
            "bot:no_settings" => Ok(Self::BotNoSettings),
            "stats:show" => Ok(Self::StatsShow),
            "settings:menu" | "settings:open" | "settings:cancel" => Ok(Self::SettingsMenu),
            "settings:back" => Ok(Self::SettingsBack),
            "settings:credentials" => Ok(Self::SettingsCredentials),
            "credentials:edit" => Ok(Self::CredentialsEdit),
            "credentials:save" => Ok(Self::CredentialsSave),
            "settings:filters" => Ok(Self::SettingsFilters),
            "filters:edit" => Ok(Self::FiltersEdit),
            "filters:save" => Ok(Self::FiltersSave),
            "settings:notifications" => Ok(Self::SettingsNotifications),
            "settings:notify_toggle" => Ok(Self::NotifyToggle),
            other => Err(CallbackParseError::Unknown(other.to_string())),
        }
    }

    /// Payload to attach to a button.
    #[must_use]
    pub fn data(&self) -> String {
        match self {
            Self::Retry(slug) => format!("retry:{slug}"),
            Self::Skip(slug) => format!("skip:{slug}"),
            other => other.static_data().to_string(),
        }
    }

    const fn static_data(&self) -> &'static str {
        match self {
            Self::BotStart => "bot:start",
            Self::BotStop => "bot:stop",
            Self::BotNoSettings => "bot:no_settings",
            Self::StatsShow => "stats:show",
            Self::SettingsMenu => "settings:menu",
            Self::SettingsBack => "settings:back",
            Self::SettingsCredentials => "settings:credentials",
            Self::CredentialsEdit => "credentials:edit",
            Self::CredentialsSave => "credentials:save",
            Self::SettingsFilters => "settings:filters",
            Self::FiltersEdit => "filters:edit",
            Self::FiltersSave => "filters:save",
            Self::SettingsNotifications => "settings:notifications",
            Self::NotifyToggle => "settings:notify_toggle",
            Self::Retry(_) => "retry:",
            Self::Skip(_) => "skip:",
        }
    }
}

fn slug_arg(slug: &str, action: &'static str) -> Result<OrderSlug, CallbackParseError> {
    if slug.is_empty() {
        return Err(CallbackParseError::MissingSlug(action));
    }
    Ok(OrderSlug::new(slug))
}
