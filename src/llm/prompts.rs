use crate::llm::WindowRequest;

/// System prompt for the chapter generator
pub const SYSTEM_PROMPT: &str = r#"You split video transcripts into chapters.

1. Chapters must represent distinct topics or sections of the video.
2. Chapter names must be concise (2-5 words) but descriptive.
3. Start and end times must be taken from the transcript timestamps, in seconds.
4. Chapters must flow in order and cover the whole excerpt from its first to its last timestamp.
5. Prefer content coherence over hitting a specific number of chapters.

The transcript format is [start_time-end_time] text.
Submit your answer with the submit_chapters tool."#;

/// Build the user prompt for a window
pub fn build_window_prompt(request: &WindowRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("# Window: {}\n", request.window_id));
    prompt.push_str(&format!(
        "Time range: {:.2}s - {:.2}s\n",
        request.start_time, request.end_time
    ));
    prompt.push_str(&format!(
        "Chapter limit: do not exceed {} chapters. This is a hard limit, not a target.\n\n",
        request.max_chapters
    ));

    prompt.push_str("## Transcript\n");
    prompt.push_str(&request.transcript_text);
    prompt.push_str("\n\n");

    prompt.push_str("## Instructions\n");
    prompt.push_str("Identify the logical chapter breaks in this transcript excerpt.\n");
    prompt.push_str(&format!(
        "The first chapter must start at {:.2} and the last chapter must end at {:.2}.\n",
        request.start_time, request.end_time
    ));
    prompt.push_str(
        "If you cannot use the tool, reply ONLY with JSON of the form \
         {\"chapters\": [{\"chapter_name\": \"...\", \"start_time\": 0.0, \"end_time\": 0.0}]}\n",
    );

    prompt
}
