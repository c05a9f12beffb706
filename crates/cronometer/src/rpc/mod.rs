//! RPC codec and client.
//!
//! This module encodes the pipe-delimited request frames the remote service
//! expects, decodes its `//OK` / failure response envelopes, and sends calls
//! over an authenticated HTTP session.

pub mod calls;
mod client;
mod codec;

pub(crate) use client::RpcClient;
pub use codec::{
    FRAME_FLAGS, OK_MARKER, PROTOCOL_VERSION, RpcFailure, RpcRequest, RpcResult, RpcValue,
    TypeTag, TypedArg, decode,
};
