pub mod clean;
pub mod normalize;
pub mod page_numbers;
pub mod tocs;
