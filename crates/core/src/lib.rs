//! Inkpost Core - Shared types library.
//!
//! This crate provides the types every Inkpost component agrees on:
//! - `client` - REST client, key-value storage and session manager
//! - `cli` - Command-line front end for the blog API
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision logic - no I/O, no
//! storage access, no HTTP clients. Session transitions and authorization
//! checks live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and email addresses
//! - [`models`] - Wire payloads and input forms
//! - [`session`] - Session value and its state machine
//! - [`gate`] - Advisory authorization predicates and endpoint dispatch
//! - [`validation`] - Client-side form validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod gate;
pub mod models;
pub mod session;
pub mod types;
pub mod validation;

pub use gate::{Action, Actor, Denied, Scope};
pub use models::{
    Envelope, ErrorBody, LoginForm, LoginResponse, Post, PostDraft, Profile, RegisterForm, User,
};
pub use session::{InvalidTransition, Session, SessionEvent, SessionState};
pub use types::*;
pub use validation::ValidationError;
