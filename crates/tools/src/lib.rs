//! LinkLab Tools - command line front end for the stack simulator
//!
//! The `linklab` binary drives the transmit and receive pipelines from the
//! shell: `tx` writes a modulated WAV file, `rx` decodes one, and
//! `simulate` runs the full loop through the noisy channel in one process.

pub mod config;
pub mod opts;
pub mod wav;
