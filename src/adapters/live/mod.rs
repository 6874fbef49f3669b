//! Live adapters that call real service endpoints.

pub mod gemini;
