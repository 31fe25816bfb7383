//! meshgate CLI library.
//!
//! Command implementations for the `meshgate` binary: input discovery,
//! running validation sessions, rendering reports and writing fixes back.

pub mod commands;
pub mod logging;
