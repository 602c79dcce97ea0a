//! Pure mapping from a result set to display cards.

use shared::protocol::{ResultSet, RESULT_KEY_SUFFIX};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub key: String,
    pub label: String,
    pub url: String,
}

impl ResultCard {
    /// File name offered when saving this result locally.
    pub fn suggested_file_name(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("{}.png", self.key))
    }
}

/// Load status of one result image. Only the card whose image failed is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLoadState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

/// Card title for a result key: one trailing `_result` is stripped, the rest
/// is split on `_` and each word capitalized, joined by spaces
/// (`xor_result` -> `Xor`, `high_pass_result` -> `High Pass`). A key that
/// strips to nothing is shown as is.
pub fn display_label(key: &str) -> String {
    let stem = key.strip_suffix(RESULT_KEY_SUFFIX).unwrap_or(key);
    let label = stem
        .split('_')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    if label.is_empty() {
        key.to_string()
    } else {
        label
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn result_cards(results: &ResultSet) -> Vec<ResultCard> {
    results
        .iter()
        .map(|entry| ResultCard {
            key: entry.key.clone(),
            label: display_label(&entry.key),
            url: entry.url.clone(),
        })
        .collect()
}

pub fn visible_cards<'a, F>(
    cards: &'a [ResultCard],
    load_state: F,
) -> impl Iterator<Item = &'a ResultCard> + 'a
where
    F: Fn(&ResultCard) -> ImageLoadState + 'a,
{
    cards
        .iter()
        .filter(move |card| load_state(*card) != ImageLoadState::Failed)
}

#[cfg(test)]
#[path = "tests/results_tests.rs"]
mod tests;
