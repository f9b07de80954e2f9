//! OAuth device-code authorization, token refresh and credential storage.

pub mod device_code;
pub mod error;
pub mod refresh;
pub mod service;
pub mod store;
pub mod token;

pub use device_code::{
    DeviceAuthorizer, DeviceCodeChallenge, DeviceCodeNotifier, DevicePoll, PollDelay, TokioDelay,
    TracingNotifier,
};
pub use error::AuthError;
pub use refresh::TokenRefresher;
pub use service::AuthSession;
pub use store::{FileTokenStore, TokenStore, TokenStoreConfig};
pub use token::{AuthorizedCredential, Credential};
