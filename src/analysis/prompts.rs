use crate::dimension::Dimension;

pub fn system_prompt(dimension: Dimension) -> String {
    format!(
        "You are a privacy analysis expert specializing in {dimension}. \
        Analyze the given content and provide a comprehensive assessment. \
        Be concise but thorough."
    )
}

pub fn user_prompt(dimension: Dimension, input: &str) -> String {
    let focus = match dimension {
        Dimension::Exposure => {
            "EXPOSURE risks: Identify explicit personal details (names, phone numbers, \
            addresses, workplaces, schedules, locations) that directly reveal the user's identity."
        }
        Dimension::Inference => {
            "INFERENCE risks: Identify subtle cues (tone, habits, interests, timing, location \
            hints) that allow algorithms to infer hidden attributes (emotions, income, health, \
            relationships)."
        }
        Dimension::Audience => {
            "AUDIENCE & CONSEQUENCES risks: Identify potential unintended audiences (employers, \
            institutions, unknown viewers) and possible reputational effects."
        }
        Dimension::Platforms => {
            "PLATFORMS & RULES risks: Assess how platform algorithms and policies affect content \
            visibility, circulation, and privacy risk."
        }
        Dimension::Amplification => {
            "AMPLIFICATION risks: Evaluate potential for viral spread through algorithms, public \
            opinion, or group sharing."
        }
        Dimension::Manipulability => {
            "MANIPULABILITY risks: Assess how the content could be reframed, edited, taken out of \
            context, or combined with other data to alter meaning."
        }
    };

    format!("Analyze this content for {focus} Content: \"{input}\"")
}
