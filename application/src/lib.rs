pub mod ask_service;
pub mod error;
