//! Locators for the dashboard's DOM.
//!
//! The dashboard is a React app with generated class names, so most
//! locators key on icon paths, labels or button text instead of classes.

pub const EMAIL_INPUT: &str =
    "input[type='email'], input[name='email'], input[autocomplete='email']";
pub const PASSWORD_INPUT: &str = "input[type='password']";
pub const SUBMIT_BUTTON: &str = "button[type='submit']";

/// Toolbar button with the funnel icon.
pub const FILTER_BUTTON: &str = "//button[.//*[local-name()='path' and (\
    contains(@d,'M13.994') or \
    contains(@d,'M14 2H2') or \
    contains(@d,'M3 4a1') or \
    contains(@d,'M1 3h14'))]]";

/// Toolbar button with the circular-arrow icon.
pub const REFRESH_BUTTON: &str = "//button[contains(@class,'eihCyf') and \
    .//*[local-name()='path' and contains(@d,'M12.794')]]";

pub const FILTER_SUBMIT: &str = "//button[normalize-space(.)='Готово' or \
    normalize-space(.)='Done' or \
    normalize-space(.)='Apply' or \
    normalize-space(.)='OK']";

pub const TAKE_BUTTON: &str = "//button[normalize-space(.)='Взять' or \
    normalize-space(.)='Take' or \
    normalize-space(.)='Принять' or \
    normalize-space(.)='Accept' or \
    normalize-space(.)='Взять ордер']";

pub const TABLE_BODY: &str = "div[role='rowgroup']";
pub const ORDER_ROWS: &str = "div[role='row'].tr";
pub const ORDER_LINK: &str = "a[href*='/trader/orders/']";

/// Class shared by every row of the filter panel.
pub const FILTER_ROW_CLASS: &str = "ljCEoY";
pub const AMOUNT_LABELS: [&str; 3] = ["Amount", "Сумма", "Sum"];
