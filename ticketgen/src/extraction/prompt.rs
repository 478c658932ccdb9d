//! Prompt text sent ahead of the requirements.

/// Separator between the prompt and the requirements text.
pub const REQUIREMENTS_HEADER: &str = "\n\n**Requirements:**\n";

/// Separator between the requirements text and the attached images.
pub const DIAGRAMS_HEADER: &str = "\n\n**Architecture Diagrams:**\n";

/// Built-in extraction prompt, used when neither the request nor the configuration supplies one.
pub const DEFAULT_PROMPT: &str = r#"
Analyze the requirements document and extract ALL EPICS, STORIES, and SUBTASKS into JSON format.

IMPORTANT INSTRUCTIONS:
1. Extract ALL epics from the requirements (both FUNCTIONAL and NON-FUNCTIONAL categories)
2. For each epic, extract ALL stories listed under it
3. For each story, extract ALL subtasks listed under it
4. Maintain the category information (functional vs non-functional)
5. Preserve the priority levels mentioned in stories
6. Keep the exact structure and hierarchy from the requirements

Output Format:
{
  "epics": [
    {
      "summary": "Epic title from requirements",
      "description": "Epic description from requirements",
      "category": "FUNCTIONAL" or "NON-FUNCTIONAL",
      "epicNumber": "Epic number (e.g., 1, 2, 3...)",
      "stories": [
        {
          "summary": "Story title from requirements",
          "description": "Story description from requirements",
          "priority": "Priority level if mentioned (High/Medium/Low)",
          "storyNumber": "Story number within epic",
          "subtasks": [
            {
              "summary": "Subtask description from requirements",
              "subtaskNumber": "Subtask number"
            }
          ]
        }
      ]
    }
  ]
}

CRITICAL: Extract EVERY epic from the requirements document. Do not limit the number of epics.
If the requirements have 17 epics, output all 17 epics with their complete hierarchy.

Return ONLY valid JSON. No additional text or explanations.
"#;
