pub mod icons;
pub mod render;
pub mod spinner;

pub use render::{
    format_date, render_article, render_article_row, render_catalog, render_tags, terminal_width,
};
pub use spinner::Spinner;
