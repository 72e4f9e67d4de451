pub mod store;
pub mod types;

pub use store::{
    dedupe_papers, load_papers, read_json, save_papers, write_bytes, write_json, write_text,
};
pub use types::Paper;
