// Resume ranking engine
// Implements: requirements digest, candidate summary, requirements match,
// relative comparison against a baseline, score fusion and ranking.
// All oracle calls go through the llm_client::Oracle trait.

pub mod handlers;
pub mod jd_digest;
pub mod jd_match;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod relative;
pub mod summarizer;
