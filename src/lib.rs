//! Weekend tutoring scheduler.
//!
//! The crate holds both halves of the application: the scheduling service (`endpoints`,
//! `database`, `scheduler`) and the client side that collects input and shows results
//! (`form`, `client`, `render`).

pub mod client;
pub mod config;
pub mod database;
pub mod endpoints;
pub mod form;
pub mod model;
pub mod render;
pub mod scheduler;
