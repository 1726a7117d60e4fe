//! Scenario flows
//!
//! The executable UI workflows the harness can run. There is one: the
//! search-and-paginate validation.

mod search;

pub use search::{ScenarioError, SearchScenario};
