// OctoPrint API client modules
//
// Covers the REST endpoints under api/printer, api/job and api/files.

pub mod client;
pub mod job;
pub mod printer;

pub use client::OctoPrintClient;
pub use job::JobCommand;
