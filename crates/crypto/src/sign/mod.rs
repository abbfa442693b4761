//! Signing and verification. Ed25519 (`eddsa`) is the sole signature suite
//! the protocol uses (§4.1); `batch` adds Rayon-parallelized batch
//! verification for the Name-Index aggregator's many-entries-per-record case
//! (§4.5).

pub mod batch;
pub mod eddsa;
