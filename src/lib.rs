// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 stagehand contributors

//! # stagehand - Pipeline Stage Toolkit
//!
//! `stagehand` packages the recurring stage functions of agent-based delivery
//! pipelines as one binary with one subcommand per stage.
//!
//! ## Features
//!
//! - **Stage functions** - Clone, compile, unit-test, containerize, deploy
//! - **Build diary** - A JSON record handed from the build stage to later stages
//! - **Pipeline bridge** - Variable export and build-number control via agent markers
//! - **Platform dispatch** - Maven, .NET, NPM, and Python toolchains behind one trait
//!
//! ## Quick Start
//!
//! ```bash
//! # Prepare the build stage directories
//! STAGE_NAME=BUILD stagehand setup-stage
//!
//! # Clone and archive the source
//! GIT_URL=https://example.com/app.git stagehand git-clone
//!
//! # Compile and publish the diary
//! TARGET_PLATFORM=MAVEN stagehand compile
//! stagehand write-diary
//! ```

pub mod bridge;
pub mod cli;
pub mod diary;
pub mod errors;
pub mod fsops;
pub mod invoker;
pub mod stages;
pub mod toolchain;

// Re-export commonly used types
pub use diary::BuildDiary;
pub use errors::{StagehandError, StagehandResult};
pub use invoker::Invocation;
pub use toolchain::Platform;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
