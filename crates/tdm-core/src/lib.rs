pub mod acquire;
pub mod catalog;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod job_db;
pub mod logging;
pub mod naming;
