//! Core interfaces and types: output commands, stream identities, text helpers.

pub mod output;
pub mod stream;
pub mod text;
