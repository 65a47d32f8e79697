pub mod ask_state;
pub mod ask_status;
pub mod models;
pub mod ports;
pub mod prompt;
