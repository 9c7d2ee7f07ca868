// Section ranking core: normalize → detect sections → classify persona / extract
// job keywords → score → rank → refine.
// Everything below `handlers` is synchronous and pure; handlers run it inside
// tokio::task::spawn_blocking.

pub mod handlers;
pub mod job_keywords;
pub mod normalizer;
pub mod persona;
pub mod pipeline;
pub mod ranker;
pub mod refiner;
pub mod relevance;
pub mod section_detector;
pub mod text;
