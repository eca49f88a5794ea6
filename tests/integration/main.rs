//! Integration tests driving the job pipelines end to end against
//! in-memory sources, a recording notifier and temp files.

mod mocks;
mod monitor;
