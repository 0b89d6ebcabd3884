//! Message texts. All output is Telegram HTML.

use std::fmt::Write as _;

use crate::domain::{
    format_thousands, Amount, AmountRange, Credentials, OrderLogEntry, OrderStatus, Settings,
};

/// Log entries listed in statistics.
pub const STATS_LIMIT: usize = 5;
/// Length of the slug prefix shown in statistics.
const STATS_SLUG_PREFIX: usize = 18;

/// Escape text for Telegram HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn main_menu(settings: &Settings, is_running: bool) -> String {
    let status = if is_running { "работает" } else { "остановлен" };
    let range = settings.amount_range();
    let filter = if range.is_unbounded() {
        "не задан".to_string()
    } else {
        format!("{range} ₽")
    };
    let notify = if settings.notify_taken { "ВКЛ" } else { "ВЫКЛ" };

    format!(
        "Cards2cards бот\n\n\
        Статус: {status}\n\
        Фильтр суммы: {filter}\n\
        Уведомления о взятых ордерах: {notify}"
    )
}

pub fn stats(taken: i64, failed: i64, last: &[OrderLogEntry]) -> String {
    let mut text = format!("Статистика\n\nВзято ордеров: {taken}\nОшибок: {failed}");
    if last.is_empty() {
        return text;
    }

    let _ = write!(text, "\n\nПоследние {STATS_LIMIT} записей:");
    for entry in last {
        let icon = match entry.status {
            OrderStatus::Taken => '+',
            OrderStatus::Failed => 'x',
        };
        let amount = match entry.amount {
            Some(value) if !value.is_zero() => format!("{} RUB", format_thousands(value)),
            _ => "—".to_string(),
        };
        let slug: String = entry.slug.chars().take(STATS_SLUG_PREFIX).collect();
        let _ = write!(
            text,
            "\n[{icon}] {}  {amount}  <code>{}...</code>",
            entry.taken_at.format("%d.%m %H:%M"),
            escape_html(&slug)
        );
    }
    text
}

pub const LOGIN_PROMPT: &str = "Введите логин (email) для входа на cards2cards:";
pub const LOGIN_INVALID: &str = "Введите корректный email:";
pub const PASSWORD_PROMPT: &str = "Введите пароль:";
pub const PASSWORD_EMPTY: &str = "Пароль не может быть пустым. Введите пароль:";
pub const MIN_INVALID: &str = "Введите число (например, 1000) или <b>-</b> чтобы пропустить:";
pub const MAX_INVALID: &str = "Введите число (например, 50000) или <b>-</b> чтобы пропустить:";

pub fn credentials_review(credentials: &Credentials) -> String {
    format!(
        "Проверьте данные для входа:\n\n\
        Логин: <code>{}</code>\n\
        Пароль: {}",
        escape_html(&credentials.login),
        "*".repeat(credentials.password.chars().count())
    )
}

fn current_hint(value: Option<Amount>) -> String {
    match value {
        Some(amount) if !amount.is_zero() => format!(" (сейчас: {})", format_thousands(amount)),
        _ => String::new(),
    }
}

pub fn min_prompt(current: Option<Amount>) -> String {
    format!(
        "Введите минимальную сумму ордера (₽){}.\n\
        Отправьте <b>-</b> чтобы не ограничивать.",
        current_hint(current)
    )
}

pub fn max_prompt(current: Option<Amount>) -> String {
    format!(
        "Введите максимальную сумму ордера (₽){}.\n\
        Отправьте <b>-</b> чтобы не ограничивать.",
        current_hint(current)
    )
}

pub fn filters_review(range: &AmountRange) -> String {
    let bound = |value: Option<Amount>| match value {
        Some(amount) if !amount.is_zero() => format!("{} ₽", format_thousands(amount)),
        _ => "не задана".to_string(),
    };
    format!(
        "Проверьте фильтры суммы:\n\n\
        Минимум: {}\n\
        Максимум: {}",
        bound(range.min),
        bound(range.max)
    )
}

pub fn retry_scheduled(slug: &str) -> String {
    format!(
        "Повтор попытки для ордера <code>{}</code> запланирован.",
        escape_html(slug)
    )
}

pub fn skipped(slug: &str) -> String {
    format!("Ордер <code>{}</code> пропущен.", escape_html(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html("<b>&\"x\"</b>"), "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn main_menu_without_filter() {
        let text = main_menu(&Settings::default(), false);
        assert_eq!(
            text,
            "Cards2cards бот\n\n\
            Статус: остановлен\n\
            Фильтр суммы: не задан\n\
            Уведомления о взятых ордерах: ВКЛ"
        );
    }

    #[test]
    fn main_menu_with_filter_running() {
        let settings = Settings {
            min_amount: Some(dec!(1000)),
            max_amount: Some(dec!(50000)),
            notify_taken: false,
            ..Settings::default()
        };
        let text = main_menu(&settings, true);
        assert!(text.contains("Статус: работает"));
        assert!(text.contains("Фильтр суммы: от 1,000 до 50,000 ₽"));
        assert!(text.ends_with("ВЫКЛ"));
    }

    #[test]
    fn stats_lists_recent_entries() {
        let entries = vec![
            OrderLogEntry {
                id: 2,
                slug: "trade-0123456789abcdefXYZ".into(),
                amount: Some(dec!(12345.6)),
                status: OrderStatus::Taken,
                taken_at: Utc.with_ymd_and_hms(2026, 2, 17, 9, 5, 0).unwrap(),
            },
            OrderLogEntry {
                id: 1,
                slug: "trade-1".into(),
                amount: None,
                status: OrderStatus::Failed,
                taken_at: Utc.with_ymd_and_hms(2026, 2, 16, 23, 59, 0).unwrap(),
            },
        ];
        let text = stats(1, 1, &entries);

        assert!(text.starts_with("Статистика\n\nВзято ордеров: 1\nОшибок: 1"));
        assert!(text.contains("[+] 17.02 09:05  12,346 RUB  <code>trade-0123456789ab...</code>"));
        assert!(text.contains("[x] 16.02 23:59  —  <code>trade-1...</code>"));
    }

    #[test]
    fn stats_without_entries_has_no_listing() {
        assert_eq!(stats(0, 0, &[]), "Статистика\n\nВзято ордеров: 0\nОшибок: 0");
    }

    #[test]
    fn credentials_review_masks_password() {
        let text = credentials_review(&Credentials {
            login: "a@b.c".into(),
            password: "пароль".into(),
        });
        assert!(text.contains("Логин: <code>a@b.c</code>"));
        assert!(text.ends_with("Пароль: ******"));
    }

    #[test]
    fn prompts_show_current_bound() {
        assert!(min_prompt(Some(dec!(1500))).contains("(₽) (сейчас: 1,500)."));
        assert!(max_prompt(None).starts_with("Введите максимальную сумму ордера (₽).\n"));
    }

    #[test]
    fn filters_review_marks_missing_bounds() {
        let text = filters_review(&AmountRange::new(None, Some(dec!(20000))));
        assert!(text.contains("Минимум: не задана"));
        assert!(text.contains("Максимум: 20,000 ₽"));
    }
}
