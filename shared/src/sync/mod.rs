pub mod callbacks;
pub mod change_tracker;
pub mod dirty_mask;
pub mod error;
pub mod settings;
pub mod sync_dictionary;
pub mod sync_handle;
pub mod sync_list;
pub mod sync_payloads;
pub mod sync_set;
pub mod sync_type;
pub mod sync_var;
