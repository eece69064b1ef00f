//! Wire Protocol Module
//!
//! Defines the framing and message contracts the driver and the engines use to
//! talk to each other over TCP. Both roles share this single implementation,
//! so a frame written by one side is by construction readable by the other.
//!
//! ## Core Concepts
//! - **Framing**: every transmission is an 8-byte ASCII decimal length header
//!   (right-justified, space-padded) followed by exactly that many payload
//!   bytes. There is no payload size limit; receivers allocate dynamically.
//! - **Encoding**: payloads are JSON. A request is a list of records; a
//!   response is either a year-to-statistics map or an error object.
//! - **One-shot connections**: exactly one request/response exchange per
//!   connection, no reuse, no pipelining.

pub mod framing;
pub mod types;
