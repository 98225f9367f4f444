pub mod bridge;
pub mod demo;
pub mod session;

pub use bridge::AuthBridge;
pub use demo::DemoAccount;
pub use session::{AuthStatus, LocalSession, LocalUser, RemoteIdentity, RemoteSession};
