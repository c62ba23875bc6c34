//! Prompt text for the study assistant.

use studylife_types::wellness::WellnessMetrics;

use super::service::ChatContext;

/// Builds the prompts sent to the generative text service.
pub struct PromptBuilder;

impl PromptBuilder {
    /// System instruction for the chat assistant.
    ///
    /// Names the user (or "Student") and, when known, last night's sleep.
    pub fn chat_system(context: &ChatContext) -> String {
        let name = context
            .user_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Student");
        let sleep_line = context
            .sleep_hours
            .filter(|h| *h > 0.0)
            .map(|h| format!("Last night's sleep: {h} hours"))
            .unwrap_or_default();

        format!(
            "You are StudentLifeOS, an AI assistant for university students.\n\
             You help with:\n\
             - Study planning and productivity\n\
             - Sleep and health\n\
             - Stress management and mental wellness\n\
             - Academic advice and motivation\n\
             \n\
             Current User: {name}\n\
             {sleep_line}\n\
             \n\
             Be supportive, encouraging and practical. Keep responses concise.\n\
             \n\
             FILE EXPORT:\n\
             If the user asks to save, download or export content, begin the response with \
             [DOWNLOAD:Filename] followed by the content to save."
        )
    }

    /// Single-turn prompt for the dashboard wellness tip.
    pub fn insight(metrics: &WellnessMetrics) -> String {
        format!(
            "As a wellness advisor for a university student:\n\
             - Sleep last night: {} hours\n\
             - Current energy level: {}/10\n\
             \n\
             Give a brief, personalized wellness tip (2-3 sentences max). Be encouraging and practical.",
            metrics.sleep_hours,
            metrics.energy_out_of_ten()
        )
    }

    /// Single-turn prompt asking for a JSON study plan.
    pub fn study_plan(topic: &str) -> String {
        format!(
            "Create a study plan for: \"{topic}\"\n\
             \n\
             Return ONLY a JSON array with 3-5 tasks. Each task must have:\n\
             - \"title\": string (concise task description)\n\
             - \"priority\": \"High\" | \"Medium\" | \"Low\"\n\
             \n\
             Example format:\n\
             [{{\"title\": \"Review chapter 1\", \"priority\": \"High\"}}, {{\"title\": \"Practice problems\", \"priority\": \"Medium\"}}]\n\
             \n\
             Return ONLY the JSON array, no other text."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_system_names_user_and_sleep() {
        let prompt = PromptBuilder::chat_system(&ChatContext {
            user_name: Some("Ada".into()),
            sleep_hours: Some(7.5),
        });
        assert!(prompt.contains("Current User: Ada"));
        assert!(prompt.contains("Last night's sleep: 7.5 hours"));
    }

    #[test]
    fn chat_system_defaults_to_student_and_omits_zero_sleep() {
        let prompt = PromptBuilder::chat_system(&ChatContext {
            user_name: Some("  ".into()),
            sleep_hours: Some(0.0),
        });
        assert!(prompt.contains("Current User: Student"));
        assert!(!prompt.contains("Last night's sleep"));
    }

    #[test]
    fn insight_uses_ten_point_energy_scale() {
        let prompt = PromptBuilder::insight(&WellnessMetrics {
            sleep_hours: 5.0,
            energy_level: 70,
        });
        assert!(prompt.contains("Sleep last night: 5 hours"));
        assert!(prompt.contains("7/10"));
    }

    #[test]
    fn study_plan_quotes_topic() {
        let prompt = PromptBuilder::study_plan("Linear Algebra");
        assert!(prompt.contains("\"Linear Algebra\""));
        assert!(prompt.contains("[{\"title\""));
    }
}
