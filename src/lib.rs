//! Shared feature modules for the desk-automation exercise binaries.
//!
//! Each binary under `src/bin/` is a self-contained exercise; the modules
//! here are the bits several of them reuse: logging setup, placeholder
//! substitution, the document/worksheet models and small input helpers.

pub mod dates;
pub mod document;
pub mod hostinfo;
pub mod logging;
pub mod placeholder;
pub mod prompt;
pub mod sections;
pub mod snapshot;
pub mod worksheet;
