pub mod discovery;
pub mod enrichment;
pub mod fetcher;
pub mod orchestrator;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
