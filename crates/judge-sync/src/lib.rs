pub mod client;
pub mod config;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod events;
pub mod resource;
pub mod session;
pub mod sync;
pub mod throttle;

pub use client::JudgeClient;
pub use config::{PollSettings, SyncConfig};
pub use credentials::{CredentialProvider, FileTokenStore, StaticToken};
pub use error::{Result, SyncError};
pub use events::{EventBroadcaster, EventStream, SyncEvent};
pub use resource::{
    PollResource, ResourceKind, SelfTestResource, SnapshotSource, SubmissionResource,
};
pub use session::{
    PollCallbacks, PollOutcome, PollPhase, Poller, SelfTestPoller, SessionId, SubmissionPoller,
};
pub use sync::JudgeSync;
pub use throttle::Cooldown;
