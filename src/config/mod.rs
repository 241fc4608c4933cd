// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for wmclient
//!
//! Handles loading client configuration from file and environment.

pub mod settings;

pub use settings::*;
