// payguard-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)] // On autorise le manque de doc pour le moment

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Contracts the application needs (dataset sources...)
pub mod ports;

// 2. Domain (Cœur du métier)
// Checks, datasets, anomaly detection, scoring, narrative.
// Pure and synchronous: no I/O, no async.
pub mod domain;

// 3. Infrastructure (Adapters)
// Config files, DuckDB CSV loader, JSON reports.
// Dépend du Domain et des Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (concurrent detection, full assessment run).
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use payguard_core::PayguardError;
pub use error::PayguardError;
