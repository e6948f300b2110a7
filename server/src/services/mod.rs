//! Domain services used by the HTTP routes.
//!
//! Service modules own validation and outbound integrations so route
//! handlers stay focused on protocol translation.

pub mod contact;
pub mod mail;
pub mod magazine;
