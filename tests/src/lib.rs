#![cfg(test)]
//! End-to-end circulation scenarios against a fully wired engine.

mod support;

mod circulation;
mod concurrency;
