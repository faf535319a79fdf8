use std::collections::HashSet;

use regex::Regex;

/// Validity requirement a rule's output must satisfy before the rewrite is
/// accepted.
#[derive(Debug, Clone, Copy)]
enum StemCheck {
    /// Accept any rewrite. Used by whole-word rules and the plural chain.
    Always,
    /// Accept only when the reduced word is a recognized base verb.
    Verb,
    /// Accept only when the reduced word is a recognized base adjective.
    Adjective,
}

/// One rewrite rule: an anchored pattern, its replacement template, and the
/// check gating the rewrite.
struct Rule {
    pattern: Regex,
    replacement: &'static str,
    check: StemCheck,
}

fn compile(rules: &[(&str, &'static str, StemCheck)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|&(pattern, replacement, check)| Rule {
            pattern: Regex::new(pattern).unwrap(),
            replacement,
            check,
        })
        .collect()
}

/// Base adjectives a comparative or superlative suffix rule may reduce to.
/// A suffix match whose stem is not listed here is passed over, so ordinary
/// er/est-final nouns (mister, computer, interest) survive untouched.
const ADJECTIVE_STEMS: &[&str] = &[
    "angry", "big", "brave", "bright", "broad", "busy", "calm", "cheap", "clean", "clear",
    "clever", "close", "cloudy", "cold", "cool", "crazy", "cute", "dark", "dear", "deep",
    "dirty", "dry", "early", "easy", "empty", "fair", "fast", "fat", "fine", "firm", "flat",
    "fresh", "full", "funny", "gentle", "grand", "great", "happy", "hard", "healthy", "heavy",
    "high", "hot", "huge", "hungry", "kind", "large", "late", "lazy", "light", "long", "loose",
    "loud", "low", "lucky", "mad", "narrow", "near", "neat", "new", "nice", "noisy", "old",
    "pale", "plain", "poor", "pretty", "proud", "quick", "quiet", "rainy", "rare", "rich",
    "rough", "rude", "sad", "safe", "sharp", "short", "simple", "slim", "slow", "small",
    "smart", "smooth", "soft", "sour", "strange", "strong", "sunny", "sweet", "tall", "thick",
    "thin", "tidy", "tight", "tiny", "tough", "warm", "weak", "wealthy", "wet", "wide", "wild",
    "windy", "wise", "young",
];

/// Base verbs a tense suffix rule may reduce to. Same gate as the adjective
/// list: an ed/ing match whose stem is not listed stays unreduced, which
/// keeps words like "contained", "morning", or "thing" whole.
const VERB_STEMS: &[&str] = &[
    "add", "ask", "bake", "be", "become", "believe", "bring", "brush", "build", "call",
    "carry", "change", "check", "clean", "climb", "close", "come", "cook", "copy", "count",
    "cry", "cut", "dance", "decide", "do", "dream", "drive", "drop", "eat", "end", "enjoy",
    "fall", "feel", "find", "finish", "fix", "fly", "follow", "free", "get", "give", "go",
    "happen", "hate", "have", "hear", "help", "hold", "hope", "hurry", "invite", "join",
    "jump", "keep", "kick", "kiss", "know", "laugh", "learn", "leave", "let", "like",
    "listen", "live", "lock", "look", "lose", "love", "make", "marry", "meet", "miss",
    "move", "need", "open", "pack", "paint", "park", "pass", "pay", "pick", "plan", "plant",
    "play", "point", "pull", "push", "rain", "reach", "read", "receive", "reply", "ride",
    "run", "rush", "save", "say", "see", "sell", "send", "set", "share", "shop", "show",
    "sing", "sit", "sleep", "smile", "smoke", "speak", "spend", "stand", "start", "stay",
    "stop", "study", "swim", "take", "talk", "teach", "tell", "thank", "think", "touch",
    "train", "travel", "try", "turn", "understand", "use", "visit", "vote", "wait", "walk",
    "want", "wash", "watch", "win", "wish", "work", "worry", "write",
];

/// Plural-noun reductions. The leading guard rule pins common s-final words
/// that are not plurals; matching it counts as "no change", which hands the
/// word to the verb chain where forms like "was" and "does" belong.
const PLURAL_RULES: &[(&str, &'static str, StemCheck)] = &[
    (
        "^(as|is|his|its|has|was|does|goes|says|this|thus|yes|news|series|species|always|perhaps)$",
        "${1}",
        StemCheck::Always,
    ),
    ("([^aeiou])ies$", "${1}y", StemCheck::Always),
    ("([aeiou]y)s$", "${1}", StemCheck::Always),
    ("(ss|[sxz]|[cs]h)es$", "${1}", StemCheck::Always),
    ("^leaves$", "leaf", StemCheck::Always),
    ("^wolves$", "wolf", StemCheck::Always),
    ("^lives$", "life", StemCheck::Always),
    ("([^s])ves$", "${1}fe", StemCheck::Always),
    ("^children$", "child", StemCheck::Always),
    ("^oxen$", "ox", StemCheck::Always),
    ("^(m|l)ice$", "${1}ouse", StemCheck::Always),
    ("^feet$", "foot", StemCheck::Always),
    ("^teeth$", "tooth", StemCheck::Always),
    ("^geese$", "goose", StemCheck::Always),
    ("^women$", "woman", StemCheck::Always),
    ("^men$", "man", StemCheck::Always),
    ("^people$", "person", StemCheck::Always),
    ("^cacti$", "cactus", StemCheck::Always),
    ("^fungi$", "fungus", StemCheck::Always),
    ("^phenomena$", "phenomenon", StemCheck::Always),
    ("^criteria$", "criterion", StemCheck::Always),
    ("([^su])s$", "${1}", StemCheck::Always),
];

/// Verb-tense reductions: irregular whole words first, then stem-checked
/// suffix rules. The regex crate has no backreferences, so doubled-consonant
/// endings are enumerated explicitly.
const VERB_RULES: &[(&str, &'static str, StemCheck)] = &[
    ("^am$", "be", StemCheck::Always),
    ("^is$", "be", StemCheck::Always),
    ("^are$", "be", StemCheck::Always),
    ("^was$", "be", StemCheck::Always),
    ("^were$", "be", StemCheck::Always),
    ("^been$", "be", StemCheck::Always),
    ("^has$", "have", StemCheck::Always),
    ("^had$", "have", StemCheck::Always),
    ("^does$", "do", StemCheck::Always),
    ("^did$", "do", StemCheck::Always),
    ("^says$", "say", StemCheck::Always),
    ("^said$", "say", StemCheck::Always),
    ("^goes$", "go", StemCheck::Always),
    ("^went$", "go", StemCheck::Always),
    ("^gone$", "go", StemCheck::Always),
    ("^made$", "make", StemCheck::Always),
    ("^took$", "take", StemCheck::Always),
    ("^taken$", "take", StemCheck::Always),
    ("^gave$", "give", StemCheck::Always),
    ("^given$", "give", StemCheck::Always),
    ("^came$", "come", StemCheck::Always),
    ("^became$", "become", StemCheck::Always),
    ("^saw$", "see", StemCheck::Always),
    ("^seen$", "see", StemCheck::Always),
    ("^knew$", "know", StemCheck::Always),
    ("^known$", "know", StemCheck::Always),
    ("^ate$", "eat", StemCheck::Always),
    ("^eaten$", "eat", StemCheck::Always),
    ("^got$", "get", StemCheck::Always),
    ("^gotten$", "get", StemCheck::Always),
    ("^ran$", "run", StemCheck::Always),
    ("^wrote$", "write", StemCheck::Always),
    ("^written$", "write", StemCheck::Always),
    ("^spoke$", "speak", StemCheck::Always),
    ("^spoken$", "speak", StemCheck::Always),
    ("^thought$", "think", StemCheck::Always),
    ("^brought$", "bring", StemCheck::Always),
    ("^bought$", "buy", StemCheck::Always),
    ("^found$", "find", StemCheck::Always),
    ("^felt$", "feel", StemCheck::Always),
    ("^kept$", "keep", StemCheck::Always),
    ("^left$", "leave", StemCheck::Always),
    ("^meant$", "mean", StemCheck::Always),
    ("^told$", "tell", StemCheck::Always),
    ("^understood$", "understand", StemCheck::Always),
    ("^stood$", "stand", StemCheck::Always),
    ("^heard$", "hear", StemCheck::Always),
    ("^held$", "hold", StemCheck::Always),
    ("^sat$", "sit", StemCheck::Always),
    ("^lost$", "lose", StemCheck::Always),
    ("^paid$", "pay", StemCheck::Always),
    ("^sent$", "send", StemCheck::Always),
    ("^built$", "build", StemCheck::Always),
    ("^spent$", "spend", StemCheck::Always),
    ("^won$", "win", StemCheck::Always),
    ("^lying$", "lie", StemCheck::Always),
    ("^dying$", "die", StemCheck::Always),
    ("^tying$", "tie", StemCheck::Always),
    ("^died$", "die", StemCheck::Always),
    ("^tied$", "tie", StemCheck::Always),
    ("^lied$", "lie", StemCheck::Always),
    ("^used$", "use", StemCheck::Always),
    ("^freed$", "free", StemCheck::Always),
    ("ied$", "y", StemCheck::Verb),
    ("ying$", "y", StemCheck::Verb),
    ("bbing$", "b", StemCheck::Verb),
    ("dding$", "d", StemCheck::Verb),
    ("gging$", "g", StemCheck::Verb),
    ("mming$", "m", StemCheck::Verb),
    ("nning$", "n", StemCheck::Verb),
    ("pping$", "p", StemCheck::Verb),
    ("rring$", "r", StemCheck::Verb),
    ("tting$", "t", StemCheck::Verb),
    ("cing$", "ce", StemCheck::Verb),
    ("ging$", "ge", StemCheck::Verb),
    ("sing$", "se", StemCheck::Verb),
    ("ving$", "ve", StemCheck::Verb),
    ("([^aeiou][aeiou][^aeiouwxy])ing$", "${1}e", StemCheck::Verb),
    ("ing$", "", StemCheck::Verb),
    ("bbed$", "b", StemCheck::Verb),
    ("dded$", "d", StemCheck::Verb),
    ("gged$", "g", StemCheck::Verb),
    ("mmed$", "m", StemCheck::Verb),
    ("nned$", "n", StemCheck::Verb),
    ("pped$", "p", StemCheck::Verb),
    ("rred$", "r", StemCheck::Verb),
    ("tted$", "t", StemCheck::Verb),
    ("ced$", "ce", StemCheck::Verb),
    ("ged$", "ge", StemCheck::Verb),
    ("sed$", "se", StemCheck::Verb),
    ("ved$", "ve", StemCheck::Verb),
    ("([^aeiou][aeiou][^aeiouwxy])ed$", "${1}e", StemCheck::Verb),
    ("ed$", "", StemCheck::Verb),
];

/// Comparative and superlative reductions: irregular whole words first,
/// then stem-checked suffix rules.
const COMPARATIVE_RULES: &[(&str, &'static str, StemCheck)] = &[
    ("^better$", "good", StemCheck::Always),
    ("^best$", "good", StemCheck::Always),
    ("^worse$", "bad", StemCheck::Always),
    ("^worst$", "bad", StemCheck::Always),
    ("^more$", "many", StemCheck::Always),
    ("^most$", "many", StemCheck::Always),
    ("^less$", "little", StemCheck::Always),
    ("^least$", "little", StemCheck::Always),
    ("iest$", "y", StemCheck::Adjective),
    ("ier$", "y", StemCheck::Adjective),
    ("bbest$", "b", StemCheck::Adjective),
    ("ddest$", "d", StemCheck::Adjective),
    ("ggest$", "g", StemCheck::Adjective),
    ("mmest$", "m", StemCheck::Adjective),
    ("nnest$", "n", StemCheck::Adjective),
    ("ttest$", "t", StemCheck::Adjective),
    ("bber$", "b", StemCheck::Adjective),
    ("dder$", "d", StemCheck::Adjective),
    ("gger$", "g", StemCheck::Adjective),
    ("mmer$", "m", StemCheck::Adjective),
    ("nner$", "n", StemCheck::Adjective),
    ("tter$", "t", StemCheck::Adjective),
    ("gest$", "ge", StemCheck::Adjective),
    ("ger$", "ge", StemCheck::Adjective),
    ("lest$", "le", StemCheck::Adjective),
    ("ler$", "le", StemCheck::Adjective),
    ("([^aeiou][aeiou][^aeiouwxy])est$", "${1}e", StemCheck::Adjective),
    ("([^aeiou][aeiou][^aeiouwxy])er$", "${1}e", StemCheck::Adjective),
    ("est$", "", StemCheck::Adjective),
    ("er$", "", StemCheck::Adjective),
];

/// Ordered rule chains reducing inflected forms to base forms.
///
/// Categories are tried in a fixed order: plural, verb tense, then
/// comparative/superlative. Within a category the first rule that applies
/// wins; the first category whose rule actually changes the word ends
/// reduction. A word is assumed to carry at most one inflection, so a
/// successful category is never compounded with a later one.
///
/// Suffix rules in the verb and comparative chains only apply when the word
/// they produce is a recognized base form; a match whose stem is not
/// recognized is passed over and later rules are tried. This is what keeps
/// "mister", "teacher", "summer", or "contained" whole while "smaller",
/// "walked", and "driving" still reduce.
pub struct InflectionRules {
    plural: Vec<Rule>,
    verb: Vec<Rule>,
    comparative: Vec<Rule>,
    verb_stems: HashSet<&'static str>,
    adjective_stems: HashSet<&'static str>,
}

impl InflectionRules {
    pub(super) fn new() -> Self {
        Self {
            plural: compile(PLURAL_RULES),
            verb: compile(VERB_RULES),
            comparative: compile(COMPARATIVE_RULES),
            verb_stems: VERB_STEMS.iter().copied().collect(),
            adjective_stems: ADJECTIVE_STEMS.iter().copied().collect(),
        }
    }

    /// Reduces a word (or trailing word of a phrase) to its base form.
    /// Returns the input unchanged when no category applies.
    #[must_use]
    pub fn reduce(&self, word: &str) -> String {
        for rules in [&self.plural, &self.verb, &self.comparative] {
            if let Some(reduced) = self.apply(rules, word) {
                if reduced != word {
                    return reduced;
                }
            }
        }
        word.to_string()
    }

    /// Applies the first rule that matches and passes its stem check. A
    /// guard rule rewriting the word to itself still counts as this
    /// category's match.
    fn apply(&self, rules: &[Rule], word: &str) -> Option<String> {
        for rule in rules {
            if !rule.pattern.is_match(word) {
                continue;
            }
            let rewritten = rule.pattern.replace(word, rule.replacement).into_owned();
            let accepted = match rule.check {
                StemCheck::Always => true,
                StemCheck::Verb => self.verb_stems.contains(final_word(&rewritten)),
                StemCheck::Adjective => self.adjective_stems.contains(final_word(&rewritten)),
            };
            if accepted {
                return Some(rewritten);
            }
        }
        None
    }
}

/// Suffix rules anchor at the end of the input, which may be a multi-word
/// phrase after hyphen splitting; the check applies to the rewritten final
/// word.
fn final_word(text: &str) -> &str {
    text.rsplit(' ').next().unwrap_or(text)
}
