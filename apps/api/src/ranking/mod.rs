// Resume ranking pipeline.
// normalize → vectorize/classify/similarity + experience extraction → compose → stable sort.
// All model access goes through `artifacts::ModelArtifacts`; nothing here touches disk or network.

pub mod composer;
pub mod experience;
pub mod handlers;
pub mod normalize;
pub mod orchestrator;
pub mod similarity;
