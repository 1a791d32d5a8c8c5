//! HTTP surface of the `f1results` binary, exposed as a library so the
//! router can be exercised without opening sockets.

pub mod server;
