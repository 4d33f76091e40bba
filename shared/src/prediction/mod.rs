pub mod client_buffer;
pub mod client_prediction;
pub mod driver;
pub mod error;
pub mod messages;
pub mod predicted;
pub mod replicate_entry;
pub mod server_prediction;
pub mod server_queue;
