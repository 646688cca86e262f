// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in spatial backends.

pub mod flatvec;
pub mod grid;
