//! Per-language summarization prompts.

use jot_core::Language;

/// The instruction line for a summarization request in `language`.
pub fn summary_prompt(language: Language) -> &'static str {
    match language {
        Language::En => "Summarize the following note concisely, capturing the main points:",
        Language::Ru => "Кратко изложите следующую заметку, выделив основные моменты:",
        Language::Uk => "Стисло підсумуйте наступну нотатку, виділяючи основні моменти:",
        Language::Sk => "Stručne zhrňte nasledujúcu poznámku, zachytávajúc hlavné body:",
        Language::De => {
            "Fassen Sie die folgende Notiz prägnant zusammen und erfassen Sie die Hauptpunkte:"
        }
        Language::Cs => "Stručně shrňte následující poznámku a zachyťte hlavní body:",
    }
}

/// Build the full prompt sent to the model.
pub fn build_prompt(title: &str, content: &str, language: Language) -> String {
    format!(
        "{}\n\nTitle: {}\n\nContent: {}",
        summary_prompt(language),
        title,
        content
    )
}
