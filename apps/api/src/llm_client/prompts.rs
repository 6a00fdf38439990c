// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompts used by the client itself.

/// System prompt for the key verification round-trip.
pub const VERIFY_SYSTEM: &str = "You are a helpful assistant.";

/// User message for the key verification round-trip. Kept tiny on purpose.
pub const VERIFY_PROMPT: &str = "Test message";
