//! Interactive view state: navigation, animation and per-poll
//! reconciliation, plus the render-ready view model.

pub mod animation;
pub mod model;
pub mod nav;
pub mod reconcile;

pub use animation::{AnimationController, AnimationPhase, AnimationTiming, SegmentAngles, TickMs};
pub use model::{DataState, LineOrigin, LineTargets, Segment, ViewModel};
pub use nav::{FilterDimension, Frame, NavigationStack};
pub use reconcile::{reconcile, ReconcileReport};
