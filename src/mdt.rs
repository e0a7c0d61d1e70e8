//! Main module for mdt library functionality

pub mod ast;
pub mod chunking;
pub mod conditions;
pub mod config;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod parsing;
pub mod testing;
