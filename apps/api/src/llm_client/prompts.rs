// Shared prompt constants.
// Each analysis step defines its own prompt templates in analysis/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt that enforces JSON-only output. Sent with every oracle call.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
