pub mod paths;

pub use paths::{
    MAX_DOCUMENT_BYTES, sanitize_component, temp_path_for, validate_file_size, write_atomic,
};
