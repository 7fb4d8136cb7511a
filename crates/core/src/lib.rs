//! Domain types shared by the dispatcher crates.
//!
//! Holds the job descriptor records read from a job directory, the
//! dispatch record written back after submission, and their markup
//! encodings. Nothing in here touches the filesystem or the network.

pub mod dispatch;
pub mod error;
pub mod subject;
pub mod types;
