pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod http;
pub mod layout;
pub mod models;
pub mod pages;
pub mod permissions;
pub mod query;
pub mod retry;
pub mod router;
pub mod session;
pub mod storage;

pub use app::{Console, Screen};
pub use config::ConsoleConfig;
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionProvider, SessionStatus};
