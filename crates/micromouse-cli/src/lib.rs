//! Micromouse CLI library.
//!
//! Adapters and orchestration shared by the `micromouse-cli` binary: the
//! simulator text protocol, logging bootstrap, mission phases and summary
//! rendering.

pub mod logging;
pub mod mission;
pub mod output;
pub mod protocol;
