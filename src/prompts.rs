//! Fixed instructions sent to the generation service.

/// Instruction sent alongside the uploaded photo.
pub const STYLIST_PROMPT: &str = "You are a world-class fashion stylist. Analyze the provided \
image of a single clothing item. Based on its style, color, and pattern, create three distinct, \
complete outfit descriptions. The categories for the outfits are 'Casual', 'Business', and \
'Night Out'.

For each category, provide a detailed description of the other clothing items and accessories \
that would complete the look. The description should be detailed enough to be used as a prompt \
for an AI image generator to create a flat-lay image of the outfit. The original item from the \
image must be included in each outfit description.";

/// Build the flat-lay rendering prompt for one outfit description.
#[must_use]
pub fn flat_lay_prompt(description: &str) -> String {
    format!(
        "A clean, minimalist, flat-lay photograph of a complete women's outfit arranged neatly \
         on a solid light gray background. The outfit consists of: {description}. The style \
         should be modern and chic. Studio lighting."
    )
}

/// JSON schema for the idea generator's structured output.
#[must_use]
pub fn ideas_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "category": { "type": "STRING" },
                "description": { "type": "STRING" }
            },
            "required": ["category", "description"]
        }
    })
}
