//! UseCase layer: broadcast fan-out and the per-connection session lifecycle.

pub mod broadcast;
pub mod open_session;
pub mod session;

pub use broadcast::{BroadcastConfig, BroadcastReport, Broadcaster, DeliveryPolicy, FanoutMode};
pub use open_session::OpenSessionUseCase;
pub use session::{SessionState, StreamSession};
