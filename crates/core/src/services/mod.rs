//! Batch processing services.
//!
//! - `decoders`: external blob decoders behind traits
//! - `entities`: first pass, raw records to entities + relation hints
//! - `graph`: second pass, hints to validated relation sets
//! - `ingest`: both passes plus persistence through an `EntitySink`

pub mod decoders;
pub mod entities;
pub mod graph;
pub mod ingest;
