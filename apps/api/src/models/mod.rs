mod lenient;

pub mod records;
pub mod resume;
pub mod section;
