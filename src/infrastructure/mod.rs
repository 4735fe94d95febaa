pub mod browser_session;
pub mod js_executor;

pub use browser_session::BrowserSession;
pub use js_executor::JsExecutor;
