mod common;
mod fallback_tests;
