#![allow(dead_code)]

pub mod config;
pub mod mock_gemini;
pub mod server;
