//! WebDriver adapter: drives Firefox through geckodriver.

mod driver;
mod script;
mod selectors;
mod session;

pub use driver::{firefox_capabilities, locate_geckodriver, GeckoDriver};
pub use session::{FirefoxDashboard, FirefoxLauncher};
