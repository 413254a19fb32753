#![allow(dead_code)]

pub mod fake_page;
pub mod media_server;
pub mod recording_sink;
