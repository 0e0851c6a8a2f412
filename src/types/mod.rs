//! Core type definitions for chain primitives.
//!
//! This module provides the fundamental types used throughout the engine:
//! - `Digest`: fixed-size 32-byte SHA-256 digests with a 64-hex wire form
//! - `Address`: account identifiers derived from public keys
//! - `RecoverableSignature`: compact ECDSA signatures carrying a recovery id
//! - `MerkleTree`: deterministic commitment roots for blocks and storage
//! - `decimal`: serde adapters for base-10 big-integer strings

pub mod address;
pub mod decimal;
pub mod hash;
pub mod merkle_tree;
pub mod signature;
