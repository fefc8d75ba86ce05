// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! Build diary ("publisher" record)
//!
//! A versioned, serializable record carrying provenance and deployment
//! metadata between otherwise-independent pipeline stage invocations.

mod record;
mod writer;

pub use record::{BuildDiary, ContainerRequiredEnvs, BASE_TAG_KEY};
pub use writer::{DiaryInputs, DEFAULT_PUBLIC_ENV_KEYS};

/// Default file name for the persisted diary
pub const DEFAULT_DIARY_FILE_NAME: &str = "publish.json";
