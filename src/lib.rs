pub mod aging;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod fetch;
pub mod output;
pub mod query;
pub mod record;
pub mod segments;
pub mod source;
pub mod table;
