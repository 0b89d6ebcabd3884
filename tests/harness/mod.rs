#![allow(dead_code)]

pub mod recording_notifier;
pub mod recording_responder;
pub mod temp_db;
