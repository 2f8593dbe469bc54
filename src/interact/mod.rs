//! Input side of the stage: hover-driven blend transitions and, on the
//! web target, the DOM listeners that drive them.

mod hover;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use hover::{BlendTransition, Subscription, BLEND_TRANSITION_SECS};
