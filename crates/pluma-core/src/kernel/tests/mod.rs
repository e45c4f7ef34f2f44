pub mod bootstrap_tests;
pub mod component_tests;
