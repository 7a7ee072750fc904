// Shared prompt fragments. Each feature that prompts the model keeps its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// Appended to every prompt that expects a JSON reply. `/api/generate` has no
/// separate system slot, so this travels inside the prompt body.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Respond with a single valid JSON object and nothing else. \
Do not wrap it in markdown code fences. \
Do not add explanations before or after the JSON. \
Use double quotes for every key and string value.";
