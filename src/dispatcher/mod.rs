//! # Dispatcher Module
//!
//! Turns a matched route into a controller invocation.
//!
//! ## Request Flow
//!
//! 1. The router produces [`MatchParams`](crate::router::MatchParams) carrying `_controller`
//! 2. [`DispatchEntity::from_match`] parses the notation into a
//!    [`HandlerSpec`](crate::handler_spec::HandlerSpec) and copies the parameters
//! 3. [`Dispatcher::dispatch`] looks the class and action up in the
//!    [`Registry`](crate::registry::Registry), binds parameters by name, creates a
//!    controller instance, attaches the project and request, and invokes the action
//! 4. The entity ends up `Dispatched` with the result and published parameters,
//!    ready for the [`ResponseRouter`](crate::response::ResponseRouter)
//!
//! ## Parameter Binding
//!
//! Binding is strict: every formal parameter the action declares must have a
//! same-named (case-sensitive) entry in the entity's parameters. Values are
//! passed positionally in declaration order; extra entries are ignored.
//!
//! ## Entity Lifecycle
//!
//! `Created → Configured → Dispatched`. Dispatching anything but a
//! `Configured` entity fails with
//! [`DispatchError::InvalidState`](crate::error::DispatchError::InvalidState).

mod core;
mod entity;

pub use core::{DispatchContext, Dispatcher};
pub use entity::{DispatchEntity, DispatchState};
