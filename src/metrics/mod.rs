pub mod extract;
pub mod local_day;
pub mod merge;
