//! Unit tests for the procedural macros
