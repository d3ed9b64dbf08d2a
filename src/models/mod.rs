pub mod attachment;
pub mod client;
pub mod dashboard;
pub mod frequency;
pub mod invoice;
pub mod message;
pub mod note;
pub mod project;
pub mod tag;
pub mod task;
pub mod time_log;
pub mod tracker;
pub mod user;
