mod common;
mod export_tests;
