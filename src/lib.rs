//! Process-level wiring shared by the `duebot` binaries.

pub mod config;
