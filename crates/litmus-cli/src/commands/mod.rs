//! CLI commands

pub mod action;
pub mod cluster;
pub mod condition;
pub mod fetch;
pub mod installation;
