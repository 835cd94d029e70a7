//! Integration tests for sql-reward.

pub mod batch_test;
pub mod common;
pub mod reward_test;
