//! Integration tests: ingest → replay → report, end to end.

mod pipeline;
mod scenarios;
