//! Tests for the Secret Dillon game engine and the session layer around it.

#![cfg(test)]
#![allow(clippy::bool_assert_comparison)]

pub mod card_conservation;
pub mod review;
pub mod role_assignment;
