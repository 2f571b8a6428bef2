//! Integration tests

mod support;

mod config_test;
mod schedule_test;
mod store_test;
