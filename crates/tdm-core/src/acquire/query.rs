//! Search query construction for the acquisition tool.

/// Directive asking the tool for exactly the first search hit.
pub const SINGLE_RESULT_PREFIX: &str = "ytsearch1:";

/// Qualifier narrowing results toward official audio uploads.
pub const OFFICIAL_AUDIO_QUALIFIER: &str = "official audio";

fn quoted(value: &str) -> Option<String> {
    let value = value.trim().replace('"', "");
    let value = value.trim();
    (!value.is_empty()).then(|| format!("\"{value}\""))
}

/// `ytsearch1:"<artist>" "<title>"`, omitting blank parts; `restrict_to_official`
/// appends [`OFFICIAL_AUDIO_QUALIFIER`]. Total and deterministic for any input.
pub fn build_search_query(artist: &str, title: &str, restrict_to_official: bool) -> String {
    let mut parts: Vec<String> = [quoted(artist), quoted(title)].into_iter().flatten().collect();
    if restrict_to_official {
        parts.push(OFFICIAL_AUDIO_QUALIFIER.to_string());
    }
    format!("{SINGLE_RESULT_PREFIX}{}", parts.join(" "))
}
