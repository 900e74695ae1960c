pub mod cell;
pub mod query_result;
pub mod schedule;
pub mod scheduled_query;
pub mod sort;
