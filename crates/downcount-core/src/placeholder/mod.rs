//! Placeholder resolution: engine, registry, and the host-facing bridge.
//!
//! Data flow: a [`Settings`](crate::settings::Settings) snapshot feeds an
//! [`Engine`]; [`PlaceholderRegistry::build`] turns every configured template
//! into a [`PlaceholderDefinition`]; the [`ResolutionBridge`] serves lookups
//! from the host's text consumer against an atomically swappable registry
//! snapshot.

pub mod bridge;
pub mod engine;
pub mod registry;

pub use bridge::ResolutionBridge;
pub use engine::Engine;
pub use registry::{PlaceholderDefinition, PlaceholderRegistry, Resolver};
