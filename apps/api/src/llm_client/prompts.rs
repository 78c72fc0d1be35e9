// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction appended to every prompt that rewrites résumé text.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Every employer, job title, date, degree and project name in your output \
    must appear in the attached document. Do NOT invent experience, metrics or credentials. \
    If the document does not support a claim, leave it out.";
