pub mod run;
pub mod schedule;
