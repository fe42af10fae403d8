//! Snaplapse Core (engine-agnostic)
//!
//! Keyframe tours over pannable/zoomable time-lapse video: an ordered keyframe store, the
//! interval chain built from it, per-axis view interpolation, and a timer-driven scheduler that
//! maps wall-clock time onto the chain while riding out renderer stalls. Rendering stays with
//! the host behind the [`Renderer`] trait.

pub mod config;
pub mod data;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod ids;
pub mod interp;
pub mod interval;
pub mod scheduler;
pub mod store;
pub mod stored_tour;

// Re-exports for hosts
pub use config::TourConfig;
pub use data::{Bounds, DurationInput, Keyframe};
pub use engine::Snaplapse;
pub use error::TourError;
pub use events::{EventBus, EventKind, ListenerId, Requests, TourEvent};
pub use host::{Clock, ManualClock, Renderer, SystemClock};
pub use ids::KeyframeId;
pub use interp::compute_bounds;
pub use interval::{build_chain, KeyframeInterval};
pub use scheduler::{PlaybackState, Scheduler};
pub use store::{ImportReport, KeyframeDraft, KeyframeStore};
pub use stored_tour::{parse_stored_tour_json, to_stored_tour_json};

/// Tour engine result type
pub type Result<T> = core::result::Result<T, TourError>;
