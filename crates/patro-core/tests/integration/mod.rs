mod acquire_tests;
mod common;
mod dataset_file_tests;
