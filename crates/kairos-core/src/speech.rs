//! Speech text pipeline and synthetic voice ranking.
//!
//! Text is cleaned in three declarative stages before it reaches the
//! synthesis engine:
//! 1. strip patterns (emoji, markdown, JSON fragments, timestamps)
//! 2. replace table (abbreviations spelled out)
//! 3. whitespace collapse

use std::sync::LazyLock;
use regex::Regex;

/// Upper bound on re-applying a strip pattern to peel nested fragments.
const MAX_STRIP_PASSES: usize = 8;

const STRIP_PATTERNS: &[&str] = &[
    // ISO-8601 timestamps
    r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?",
    // Clock times
    r"\b\d{1,2}:\d{2}(?::\d{2})?\b",
    // JSON objects and arrays, innermost first
    r"\{[^{}]*\}",
    r"\[[^\[\]]*\]",
    // Emoji, pictographs, dingbats, variation selectors
    r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{2B00}-\x{2BFF}\x{2300}-\x{23FF}\x{FE0F}\x{200D}]",
    // Markdown punctuation and bullets
    r"[*_#`~>|•]+",
];

const REPLACEMENTS: &[(&str, &str)] = &[
    (r"\bDra\.", "Doctora"),
    (r"\bDr\.", "Doctor"),
    (r"(\d)\s?mg\b", "${1} miligramos"),
    (r"\bmg\b", "miligramos"),
    (r"(\d)\s?ml\b", "${1} mililitros"),
    (r"\bml\b", "mililitros"),
    (r"(\d)\s?min\b", "${1} minutos"),
    (r"(\d)\s?hrs?\b", "${1} horas"),
    (r"\bhrs\b", "horas"),
    (r"\baprox\.", "aproximadamente"),
    (r"\betc\.", "etcétera"),
    (r"S/\s?(\d+(?:[.,]\d+)?)", "${1} soles"),
];

static SPACE_BEFORE_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Declarative text cleaner for speech synthesis.
pub struct SpeechPipeline {
    strip: Vec<Regex>,
    replace: Vec<(Regex, String)>,
}

impl SpeechPipeline {
    /// Build a pipeline from raw patterns. Invalid patterns are an error.
    pub fn new(strip: &[&str], replace: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let strip = strip
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let replace = replace
            .iter()
            .map(|(p, r)| Regex::new(p).map(|re| (re, r.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { strip, replace })
    }

    /// Pipeline with the kiosk's Spanish strip list and abbreviation table.
    pub fn spanish() -> Self {
        Self::new(STRIP_PATTERNS, REPLACEMENTS).expect("built-in speech patterns are valid")
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();

        for re in &self.strip {
            let mut passes = 0;
            while passes < MAX_STRIP_PASSES && re.is_match(&out) {
                out = re.replace_all(&out, " ").into_owned();
                passes += 1;
            }
        }

        for (re, replacement) in &self.replace {
            out = re.replace_all(&out, replacement.as_str()).into_owned();
        }

        let out = SPACE_BEFORE_PUNCT_RE.replace_all(&out, "$1");
        WHITESPACE_RE.replace_all(&out, " ").trim().to_string()
    }
}

impl Default for SpeechPipeline {
    fn default() -> Self {
        Self::spanish()
    }
}

// ─── Voice selection ─────────────────────────────────────────

/// A synthetic voice as reported by the platform
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceInfo {
    pub name: String,
    pub lang: String,
    pub is_default: bool,
}

const QUALITY_MARKERS: &[&str] = &["Google", "Microsoft", "Natural", "Neural"];

/// Pick the best voice for `language` (e.g. `es-ES`).
///
/// Preference: exact locale with a quality marker, exact locale, same
/// language with a quality marker, same language, platform default, first.
pub fn pick_voice(voices: &[VoiceInfo], language: &str) -> Option<usize> {
    if voices.is_empty() {
        return None;
    }
    let wanted = normalize_lang(language);
    let wanted_prefix = wanted.split('-').next().unwrap_or("").to_string();

    let score = |v: &VoiceInfo| -> u8 {
        let lang = normalize_lang(&v.lang);
        let quality = QUALITY_MARKERS.iter().any(|m| v.name.contains(m));
        let same_prefix = lang.split('-').next() == Some(wanted_prefix.as_str());
        match (lang == wanted, same_prefix, quality) {
            (true, _, true) => 5,
            (true, _, false) => 4,
            (false, true, true) => 3,
            (false, true, false) => 2,
            _ if v.is_default => 1,
            _ => 0,
        }
    };

    let mut best = 0;
    let mut best_score = score(&voices[0]);
    for (i, v) in voices.iter().enumerate().skip(1) {
        let s = score(v);
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    Some(best)
}

fn normalize_lang(lang: &str) -> String {
    lang.trim().replace('_', "-").to_lowercase()
}
