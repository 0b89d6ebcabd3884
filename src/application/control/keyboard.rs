//! Inline keyboard layouts.

use super::callback::Callback;
use crate::domain::OrderSlug;
use crate::port::{Button, Keyboard};

fn button(text: &str, callback: &Callback) -> Button {
    Button {
        text: text.to_string(),
        data: callback.data(),
    }
}

fn column(buttons: Vec<Button>) -> Keyboard {
    Keyboard {
        rows: buttons.into_iter().map(|b| vec![b]).collect(),
    }
}

/// Start/stop button for the current state, then settings and statistics.
#[must_use]
pub fn main_menu(is_running: bool, has_credentials: bool) -> Keyboard {
    let toggle = if is_running {
        button("Остановить бота", &Callback::BotStop)
    } else if has_credentials {
        button("Запустить бота", &Callback::BotStart)
    } else {
        button("Запустить бота (нет настроек)", &Callback::BotNoSettings)
    };
    column(vec![
        toggle,
        button("Настройки", &Callback::SettingsMenu),
        button("Статистика", &Callback::StatsShow),
    ])
}

#[must_use]
pub fn settings_menu() -> Keyboard {
    column(vec![
        button("Логин и пароль", &Callback::SettingsCredentials),
        button("Фильтры суммы", &Callback::SettingsFilters),
        button("Оповещения", &Callback::SettingsNotifications),
        button("Назад", &Callback::SettingsBack),
    ])
}

/// Single cancel button that returns to the settings menu.
#[must_use]
pub fn cancel() -> Keyboard {
    column(vec![button("Отмена", &Callback::SettingsMenu)])
}

fn confirm(save: &Callback, edit: &Callback) -> Keyboard {
    Keyboard {
        rows: vec![
            vec![button("Сохранить", save), button("Изменить", edit)],
            vec![button("Отмена", &Callback::SettingsMenu)],
        ],
    }
}

#[must_use]
pub fn credentials_confirm() -> Keyboard {
    confirm(&Callback::CredentialsSave, &Callback::CredentialsEdit)
}

#[must_use]
pub fn filters_confirm() -> Keyboard {
    confirm(&Callback::FiltersSave, &Callback::FiltersEdit)
}

#[must_use]
pub fn notifications(notify_taken: bool) -> Keyboard {
    let state = if notify_taken { "ВКЛ" } else { "ВЫКЛ" };
    column(vec![
        button(
            &format!("Оповещения о взятых ордерах: {state}"),
            &Callback::NotifyToggle,
        ),
        button("Назад", &Callback::SettingsMenu),
    ])
}

/// Retry and skip buttons attached to a failed-order notification.
#[must_use]
pub fn retry_or_skip(slug: &OrderSlug) -> Keyboard {
    Keyboard {
        rows: vec![vec![
            button("Повторить", &Callback::Retry(slug.clone())),
            button("Пропустить", &Callback::Skip(slug.clone())),
        ]],
    }
}
