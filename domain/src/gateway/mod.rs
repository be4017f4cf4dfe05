//! Clients for third-party services the domain talks to.

pub mod mailersend;
