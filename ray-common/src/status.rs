// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Status/error types. A C++ `Status` becomes `Result<T, RayError>`.

use std::fmt;

/// Status codes. Discriminants match the C++ `StatusCode` enum so that
/// codes carried in `GcsStatus` replies stay cross-language compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum StatusCode {
    OK = 0,
    Invalid = 4,
    UnknownError = 9,
    NotFound = 17,
    Disconnected = 18,
    InvalidArgument = 34,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OK => "OK",
            Self::Invalid => "Invalid",
            Self::UnknownError => "UnknownError",
            Self::NotFound => "NotFound",
            Self::Disconnected => "Disconnected",
            Self::InvalidArgument => "InvalidArgument",
        }
    }

    /// Map a wire code back to a `StatusCode`; unknown values become
    /// `UnknownError`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::OK,
            4 => Self::Invalid,
            17 => Self::NotFound,
            18 => Self::Disconnected,
            34 => Self::InvalidArgument,
            _ => Self::UnknownError,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The primary error type for GCS operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RayError {
    pub code: StatusCode,
    pub message: String,
}

impl RayError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::Invalid, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, msg)
    }
    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::Disconnected, msg)
    }
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, msg)
    }
    pub fn unknown(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UnknownError, msg)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StatusCode::NotFound
    }
    pub fn is_disconnected(&self) -> bool {
        self.code == StatusCode::Disconnected
    }
    pub fn is_invalid_argument(&self) -> bool {
        self.code == StatusCode::InvalidArgument
    }
}

/// Convenience type alias: `Result<T, RayError>`.
pub type RayResult<T> = Result<T, RayError>;
