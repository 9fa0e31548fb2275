//! Battle tower engine and terminal front end.
//!
//! The reducer in [`reducer`] is the battle state machine; catalog access
//! goes through the traits in [`provider`], with [`api::PokeApi`] as the
//! production implementation.

pub mod action;
pub mod api;
pub mod audio;
pub mod bosses;
pub mod combat;
pub mod config;
pub mod effect;
pub mod encounter;
pub mod error;
pub mod logging;
pub mod provider;
pub mod reducer;
pub mod rng;
pub mod state;
pub mod stats;
pub mod team;
pub mod timeline;
pub mod ui;
