//! Engine Server Module
//!
//! The server role of the system. An engine binds one loopback port, accepts
//! driver connections one at a time, and serves exactly one request per
//! connection: a framed record batch in, a framed statistics (or error)
//! response out. Parallelism lives entirely inside the compute stage; the
//! listener itself is sequential.

pub mod server;

#[cfg(test)]
mod tests;
