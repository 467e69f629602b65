//! Wren: a terminal assistant that turns plain-language requests into a
//! small set of allow-listed system commands, web searches or chat replies.

pub mod core;
pub mod services;
pub mod ui;
