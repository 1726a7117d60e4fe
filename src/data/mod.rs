//! Test data loading
//!
//! Supplies parameterized scenario inputs from a spreadsheet workbook, one
//! worksheet per test case.

mod workbook;

pub use workbook::{DataError, Workbook};
