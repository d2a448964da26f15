//! Prompt construction for the AI tier.

use acrotip_protocols::{CompletionRequest, PageContext};

pub const SYSTEM_PROMPT: &str = "You are a concise terminology expert. Provide brief, accurate \
definitions of acronyms as they are used in workplace and technical writing. Always respond with \
just the definition in 1-2 sentences.";

/// Build the user prompt for `term`, folding in whatever page context is known.
pub fn build_prompt(term: &str, context: &PageContext) -> String {
    let mut prompt = format!("Define the acronym \"{}\".", term);

    if !context.surrounding_text.is_empty() {
        prompt.push_str("\n\nContext from the page where this acronym appears:\n\"");
        prompt.push_str(&context.surrounding_text);
        prompt.push('"');
    }
    if !context.page_source.is_empty() {
        prompt.push_str("\n\nSource: ");
        prompt.push_str(&context.page_source);
    }

    prompt.push_str(
        "\n\nProvide a concise 1-2 sentence definition. If this is a well-known tech or business \
         term rather than an organization-specific one, define it in that general context.",
    );
    prompt
}

/// Full completion request for `term`.
pub fn definition_request(
    model: &str,
    max_tokens: u32,
    temperature: f32,
    term: &str,
    context: &PageContext,
) -> CompletionRequest {
    CompletionRequest::new(model, build_prompt(term, context))
        .with_system(SYSTEM_PROMPT)
        .with_max_tokens(max_tokens)
        .with_temperature(temperature)
}
