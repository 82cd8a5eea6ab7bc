//! # log4j-scout
//!
//! A light, local Log4Shell vulnerability scanner. Finds Java archives
//! reachable from running JVMs or from explicit filesystem roots, opens
//! them (nested archives included), fingerprints the JNDI lookup class,
//! and reports a per-archive verdict.
//!
//! ## Architecture
//!
//! - **mine**: heuristic extraction of jar and directory candidates from
//!   raw process-listing text
//! - **walk**: recursive archive discovery with exact-match exclusions
//! - **inspect**: zip-container inspection, nested-archive recursion,
//!   SHA-256 fingerprint classification
//! - **signatures**: curated vulnerable/patched fingerprint sets
//! - **report**: verdicts, findings, and run aggregation
//! - **scan**: target collection and the parallel inspection pool
//! - **jps**: the process-listing executable wrapper
//! - **provision**: JDK download/verify/unpack to obtain `jps` when the
//!   host has none

pub mod cli;
pub mod inspect;
pub mod jps;
pub mod mine;
pub mod provision;
pub mod report;
pub mod scan;
pub mod signatures;
pub mod walk;
