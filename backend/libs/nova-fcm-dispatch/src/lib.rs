/// Nova FCM Dispatch Library
///
/// Delivers a single push notification through Firebase Cloud Messaging.
///
/// It handles:
/// - Resolving a device token from an explicit token or a recipient profile
/// - Loading Google service account credentials
/// - Signing the RS256 JWT assertion and exchanging it for an access token
/// - HTTP v1 delivery, with the legacy server-key API as a fallback

pub mod assertion;
pub mod client;
pub mod credential;
pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod token_exchange;

pub use client::{DispatchAuth, FcmDispatchClient};
pub use credential::ServiceAccountCredential;
pub use dispatcher::{DispatchEndpoints, PushDispatcher, PushProtocol};
pub use errors::{DispatchError, ProfileStoreError};
pub use models::{PushMessage, PushRequest};
pub use resolver::ProfileStore;
pub use token_exchange::AccessToken;
