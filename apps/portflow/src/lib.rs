//! # portflow
//!
//! Command line front end for the Portflow engine: artifact validation,
//! registry inspection and scripted session replay.

pub mod cli;
pub mod config;
