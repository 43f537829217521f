#![allow(dead_code)]

pub mod config;
pub mod mock_completion;
pub mod mock_identity;
pub mod mock_speech;
pub mod server;
