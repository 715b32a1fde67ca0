//! Typed views of the JSON documents returned by the Jira Agile REST API.
//!
//! Only the fields needed to populate the board tables are modelled, everything else
//! in the responses is ignored during deserialization.
pub mod board;
pub mod core;
pub mod issue;
