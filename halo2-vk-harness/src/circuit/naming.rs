use regex::Regex;
use std::sync::LazyLock;

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_TO_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Convert a circuit identifier to the name used by its test (ie: `SimpleAddGate` to
/// `simple_add_gate`).
///
/// A run of capitals attached to a lowercase run is split before its last capital:
/// `ABCDef` gives `abc_def`.
pub fn to_test_name(identifier: &str) -> String {
    let words_split = CAPITALIZED_WORD.replace_all(identifier, "${1}_${2}");
    let words_split = LOWER_TO_UPPER.replace_all(&words_split, "${1}_${2}");

    words_split.to_lowercase()
}
