// Prompt templates sent to the language model

use super::ResponseMode;

/// System prompt for a standard turn, fusing both context sources
pub(crate) fn fusion_prompt(mode: ResponseMode, knowledge_base: &str, web_search: &str) -> String {
    format!(
        "You are an expert AI real estate assistant for Bangalore. Your goal is to help the user find a rental property.
You must use the provided context to answer the user's query.

**Response Mode:** Please provide a {mode} response.

**Context from my Knowledge Base (Neighborhood Info & Listings):**
---
{knowledge_base}
---

**Context from a Live Web Search (Current Info):**
---
{web_search}
---

Based on all the above information, answer the user's query.
Synthesize the information from the knowledge base and the web search into a single, helpful, conversational response.
If you use information from the web, mention that it's from a \"real-time search.\""
    )
}

pub(crate) fn shortlist_prompt(transcript: &str) -> String {
    format!(
        "You are a helpful assistant. Review the following conversation history between a user and an AI rental assistant.
Your task is to identify the specific properties (using their IDs from the CSV if mentioned) that the user showed positive interest in.
Present these properties as a clean, bulleted list for the user, including their area, rent, and BHK.
Ignore any properties the user dismissed or was not interested in. If no specific properties were liked, state that.

Conversation History:
---
{transcript}
---"
    )
}

pub(crate) fn match_score_prompt(preferences: &str, area: &str, description: &str) -> String {
    format!(
        "Based on the user's preferences and the neighborhood description, provide a match score.
User Preferences: \"{preferences}\"
Neighborhood Description for {area}: \"{description}\"

On a scale of 1 to 10, how well does this neighborhood match the user's preferences?
Provide the score and a single, concise sentence explaining your reasoning.
Format your response as: **Match Score for {area}: [Score]/10** \n [Your reasoning]."
    )
}
