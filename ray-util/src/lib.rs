// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Utility library shared by the GCS resource crates.
//!
//! Provides logging setup, random byte generation and time helpers.

pub mod logging;
pub mod random;
pub mod time;
