// Copyright 2024 The Ray Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0

//! Constants matching `src/ray/common/constants.h`.

/// Length of Ray full-length UniqueIDs in bytes.
pub const UNIQUE_ID_SIZE: usize = 28;

/// Precision of fractional resource quantity.
pub const RESOURCE_UNIT_SCALING: i32 = 10000;

