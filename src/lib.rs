pub mod config;
pub mod corpus;
pub mod error;
pub mod layout;
pub mod optimizer;
pub mod scorer;
// cmd and reports are binary modules (under main.rs); the library surface
// stops at the optimizer outputs.
