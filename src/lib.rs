//! # Multilabel CV
#![forbid(unsafe_code)]

/// Annotated corpus ingestion
pub mod corpus;

/// Tokenization
pub mod processing;

/// Word and label vocabularies
pub mod vocab;

/// Corpus formatting into numeric splits
pub mod format;

/// Fold partitioning and per-fold formatting
pub mod cross_validation;

/// Multi-label evaluation
pub mod evaluation;

/// Classifiers
pub mod models;

/// Experiment stages
pub mod experiment;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
