pub mod anchors;
pub mod assemble;
pub mod dedupe;
pub mod discover;
pub mod export;
pub mod planner;
pub mod score;
pub mod website_socials;

pub use anchors::AnchorStage;
pub use assemble::AssembleStage;
pub use dedupe::DedupeStage;
pub use discover::DiscoverStage;
pub use export::ExportStage;
pub use planner::PlannerStage;
pub use score::ScoreStage;
pub use website_socials::WebsiteSocialsStage;
