//! Renderer-free simulation of the scene. Everything in here works on plain
//! numbers so it can be driven and tested without a `World`.

pub mod attack;
pub mod body;
pub mod director;
pub mod events;
pub mod explosion;
pub mod hostile;
pub mod launcher;
pub mod orbital;
pub mod payload;
pub mod projectile;
pub mod random;

pub use director::{GamePhase, SceneDirector};
pub use events::{EntityId, SceneEvent};
