use chrono::{DateTime, Local, SecondsFormat, Timelike, Utc};

fn file_stem(wakeword_name: &str) -> String {
    wakeword_name.trim().replace(' ', "_")
}

/// File name for a newly recorded sample
///
/// `hey_home(T09_05_31).wav` when a wakeword name is set, otherwise the
/// RFC 3339 UTC timestamp.
pub fn sample_file_name(wakeword_name: &str, now: DateTime<Local>) -> String {
    if wakeword_name.trim().is_empty() {
        return format!(
            "{}.wav",
            now.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        );
    }

    format!(
        "{}(T{:02}_{:02}_{:02}).wav",
        file_stem(wakeword_name),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// File name for the exported model
pub fn model_file_name(wakeword_name: &str) -> String {
    format!("{}.rpw", file_stem(wakeword_name))
}
