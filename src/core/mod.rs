pub mod attachment;
pub mod auth;
pub mod backup;
pub mod chat;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod invoice;
pub mod log;
pub mod note;
pub mod project;
pub mod recur;
pub mod tag;
pub mod task;
pub mod team;
pub mod timelog;
pub mod tracker;
pub mod user;
pub mod validate;
