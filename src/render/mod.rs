//! HTML page and explanation plot rendering

pub mod page;
pub mod plots;

pub use page::{render_page, PageState};
