//! Trace input engine for on-screen keyboards.
//!
//! `InkEngine` wires the `ink_session` state machine to a recognizer and a
//! dictionary loader running on background threads. Hosts drive it through
//! the `InputMethod` trait, call `tick` and `poll` from their event loop, and
//! drain `HostEvent`s with `take_events`.

mod async_worker;
mod engine;
pub mod trace_init;


pub use engine::{EngineError, InkEngine};

pub use ink_core;
pub use ink_session;
pub use ink_session::{HostEvent, InputMethod, Key, KeyModifiers, ReselectFlags, SessionConfig};
