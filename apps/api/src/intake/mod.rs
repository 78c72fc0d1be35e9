// Document intake: upload validation, blob naming and the heuristic text parse.

pub mod extract;
pub mod handlers;
pub mod validation;
