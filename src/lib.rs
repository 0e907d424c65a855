#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::uninlined_format_args,
    clippy::unused_self
)]

//! Delegate decision protocol for the Lightbox image server.
//!
//! Per request, the host builds a [`RequestContext`], asks a [`Delegate`]
//! implementation for decisions through a fixed set of named hooks, and
//! interprets each raw [`HookResult`] into a typed outcome: an
//! authorization verdict, a backend resource locator, overlay and
//! redaction instructions, or response metadata. Shape validation happens
//! at the evaluator boundary, so a delegate returning something outside a
//! hook's declared contract surfaces as a [`DelegateError`] instead of a
//! puzzling downstream failure.

pub mod builtin;
pub mod config;
pub mod context;
pub mod delegate;
pub mod error;
pub mod evaluate;
pub mod interpret;
pub mod registry;
pub mod result;
pub mod runner;

pub use config::DelegateConfig;
pub use context::RequestContext;
pub use delegate::Delegate;
pub use error::DelegateError;
pub use evaluate::evaluate;
pub use interpret::{
    AuthVerdict, HttpResource, ImageOverlay, OverlaySpec, RedactionRegion, ResourceLocator,
    TextOverlay, RESERVED_RESPONSE_KEYS,
};
pub use registry::{HookClass, HookName};
pub use result::{HookResult, Shape};
pub use runner::DelegateRunner;
