//! Integration tests for the chunked Merkle DAG importer

mod common;
mod failure_modes;
mod import_scenarios;
mod properties;
