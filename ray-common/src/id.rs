// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Fixed-size binary identifiers.
//!
//! `NodeID` (28 bytes) keys every per-node map in the resource manager.

use std::fmt;

use crate::constants::UNIQUE_ID_SIZE;

/// Generates a fixed-size ID newtype over `[u8; N]`.
///
/// Nil is all 0xFF bytes. Binary and hex conversions come in a checked
/// (`try_*`) flavor for bytes that arrive off the wire.
macro_rules! define_ray_id {
    ($name:ident, $size:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            data: [u8; $size],
        }

        impl $name {
            /// The fixed byte size of this ID type.
            pub const SIZE: usize = $size;

            pub const fn nil() -> Self {
                Self {
                    data: [0xFF; $size],
                }
            }

            /// Create an ID from raw bytes. Panics if `bytes.len() != SIZE`.
            pub fn from_binary(bytes: &[u8]) -> Self {
                Self::try_from_binary(bytes).unwrap_or_else(|| {
                    panic!(
                        "expected {} bytes for {}, got {}",
                        $size,
                        stringify!($name),
                        bytes.len()
                    )
                })
            }

            /// Create an ID from raw bytes, `None` on a length mismatch.
            pub fn try_from_binary(bytes: &[u8]) -> Option<Self> {
                let data: [u8; $size] = bytes.try_into().ok()?;
                Some(Self { data })
            }

            /// Parse a lowercase or uppercase hex string.
            pub fn try_from_hex(hex_str: &str) -> Option<Self> {
                if hex_str.len() != $size * 2 {
                    tracing::debug!(
                        "incorrect hex string length for {}: expected {}, got {}",
                        stringify!($name),
                        $size * 2,
                        hex_str.len()
                    );
                    return None;
                }
                let bytes = hex::decode(hex_str).ok()?;
                Self::try_from_binary(&bytes)
            }

            pub fn from_random() -> Self {
                let mut data = [0u8; $size];
                ray_util::random::fill_random(&mut data);
                Self { data }
            }

            pub fn is_nil(&self) -> bool {
                self.data == [0xFF; $size]
            }

            pub fn data(&self) -> &[u8; $size] {
                &self.data
            }

            /// Owned copy of the bytes, as carried in protobuf `bytes` fields.
            pub fn binary(&self) -> Vec<u8> {
                self.data.to_vec()
            }

            pub fn hex(&self) -> String {
                hex::encode(self.data)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::nil()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.data
            }
        }
    };
}

define_ray_id!(NodeID, UNIQUE_ID_SIZE);
