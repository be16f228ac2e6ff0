//! Generated wire types (SPEC_FULL.md §C), compiled from `proto/pong.proto`
//! by `build.rs` via `tonic-build`. One-to-one with the original's
//! `proto_gen/gamemaster_pb2.py` message set.

tonic::include_proto!("pong");
