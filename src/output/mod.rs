pub mod formatter;

pub use formatter::{
    format_paper_detail, format_ranked_table, format_score, format_tsv, should_use_colors,
};
