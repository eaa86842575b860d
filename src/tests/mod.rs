pub mod partition_tests;
pub mod pipeline_tests;
