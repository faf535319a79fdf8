use std::collections::HashMap;

/// English contractions mapped to their expanded forms.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'll", "he will"),
    ("he's", "he is"),
    ("i'd", "i would"),
    ("i'll", "i will"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("mightn't", "might not"),
    ("mustn't", "must not"),
    ("shan't", "shall not"),
    ("she'd", "she would"),
    ("she'll", "she will"),
    ("she's", "she is"),
    ("shouldn't", "should not"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("they'd", "they would"),
    ("they'll", "they will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("we'd", "we would"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what'll", "what will"),
    ("what're", "what are"),
    ("what's", "what is"),
    ("what've", "what have"),
    ("where's", "where is"),
    ("who'd", "who would"),
    ("who'll", "who will"),
    ("who're", "who are"),
    ("who's", "who is"),
    ("who've", "who have"),
    ("won't", "will not"),
    ("wouldn't", "would not"),
    ("you'd", "you would"),
    ("you'll", "you will"),
    ("you're", "you are"),
    ("you've", "you have"),
    ("ain't", "am not"),
    ("could've", "could have"),
    ("might've", "might have"),
    ("must've", "must have"),
    ("should've", "should have"),
    ("that'd", "that would"),
    ("that'll", "that will"),
    ("there'd", "there would"),
    ("there'll", "there will"),
    ("they'd've", "they would have"),
    ("we'd've", "we would have"),
    ("would've", "would have"),
    ("y'all", "you all"),
    ("y'all'd", "you all would"),
    ("y'all'd've", "you all would have"),
];

/// Titles, organizations, and acronyms mapped to their expansions. Dotted
/// forms are looked up both verbatim and with the trailing period removed.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("dr.", "doctor"),
    ("mr.", "mister"),
    ("mrs.", "missus"),
    ("ms.", "miss"),
    ("prof.", "professor"),
    ("rev.", "reverend"),
    ("col.", "colonel"),
    ("gen.", "general"),
    ("lt.", "lieutenant"),
    ("sgt.", "sergeant"),
    ("capt.", "captain"),
    ("cmdr.", "commander"),
    ("govt.", "government"),
    ("dept.", "department"),
    ("univ.", "university"),
    ("corp.", "corporation"),
    ("inc.", "incorporated"),
    ("co.", "company"),
    ("ltd.", "limited"),
    ("approx.", "approximately"),
    ("appt.", "appointment"),
    ("apt.", "apartment"),
    ("assn.", "association"),
    ("asst.", "assistant"),
    ("avg.", "average"),
    ("bldg.", "building"),
    ("blvd.", "boulevard"),
    ("est.", "established"),
    ("etc.", "etcetera"),
    ("exec.", "executive"),
    ("fig.", "figure"),
    ("hrs.", "hours"),
    ("info.", "information"),
    ("intl.", "international"),
    ("jr.", "junior"),
    ("min.", "minutes"),
    ("misc.", "miscellaneous"),
    ("mtg.", "meeting"),
    ("natl.", "national"),
    ("orig.", "original"),
    ("pres.", "president"),
    ("ref.", "reference"),
    ("sec.", "second"),
    ("sr.", "senior"),
    ("yr.", "year"),
    ("u.s.a.", "united states of america"),
    ("u.k.", "united kingdom"),
    ("e.g.", "for example"),
    ("i.e.", "that is"),
    ("nasa", "national aeronautics and space administration"),
    ("nato", "north atlantic treaty organization"),
    ("un", "united nations"),
    ("eu", "european union"),
    ("fbi", "federal bureau of investigation"),
    ("cia", "central intelligence agency"),
    ("ceo", "chief executive officer"),
    ("cfo", "chief financial officer"),
    ("cto", "chief technology officer"),
    ("hr", "human resources"),
    ("tv", "television"),
    ("pc", "personal computer"),
    ("asap", "as soon as possible"),
];

/// Internet slang, informal contractions, and nonstandard spellings mapped
/// to standard forms.
const SLANG: &[(&str, &str)] = &[
    ("lol", "laugh out loud"),
    ("brb", "be right back"),
    ("btw", "by the way"),
    ("fyi", "for your information"),
    ("idk", "i do not know"),
    ("tbh", "to be honest"),
    ("imo", "in my opinion"),
    ("imho", "in my honest opinion"),
    ("thx", "thanks"),
    ("ty", "thank you"),
    ("pls", "please"),
    ("plz", "please"),
    ("rn", "right now"),
    ("yep", "yes"),
    ("nope", "no"),
    ("omg", "oh my goodness"),
    ("rofl", "rolling on floor laughing"),
    ("fomo", "fear of missing out"),
    ("lemme", "let me"),
    ("gimme", "give me"),
    ("gonna", "going to"),
    ("gotta", "got to"),
    ("wanna", "want to"),
    ("dunno", "do not know"),
    ("kinda", "kind of"),
    ("sorta", "sort of"),
    ("outta", "out of"),
    ("hafta", "have to"),
    ("tryna", "trying to"),
    ("shoulda", "should have"),
    ("coulda", "could have"),
    ("woulda", "would have"),
    ("ya", "you"),
    ("goin", "going"),
    ("cuz", "because"),
    ("bout", "about"),
    ("ima", "i am going to"),
    ("tonite", "tonight"),
    ("lite", "light"),
    ("thru", "through"),
    ("nite", "night"),
    ("tho", "though"),
    ("luv", "love"),
    ("em", "them"),
    ("bro", "brother"),
    ("ur", "your"),
    ("u", "you"),
    ("r", "are"),
    ("n", "and"),
    ("2", "to"),
    ("4", "for"),
    ("gr8", "great"),
    ("l8", "late"),
    ("l8r", "later"),
    ("b4", "before"),
    ("m8", "mate"),
    ("str8", "straight"),
];

pub(super) fn contraction_map() -> HashMap<&'static str, &'static str> {
    CONTRACTIONS.iter().copied().collect()
}

pub(super) fn abbreviation_map() -> HashMap<&'static str, &'static str> {
    ABBREVIATIONS.iter().copied().collect()
}

pub(super) fn slang_map() -> HashMap<&'static str, &'static str> {
    SLANG.iter().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_contain_expected_entries() {
        assert_eq!(contraction_map().get("don't"), Some(&"do not"));
        assert_eq!(
            abbreviation_map().get("nasa"),
            Some(&"national aeronautics and space administration")
        );
        assert_eq!(slang_map().get("gonna"), Some(&"going to"));
    }

    #[test]
    fn table_keys_are_lowercase_and_unique() {
        for table in [CONTRACTIONS, ABBREVIATIONS, SLANG] {
            let mut seen = std::collections::HashSet::new();
            for (key, _) in table {
                assert_eq!(*key, key.to_lowercase());
                assert!(seen.insert(*key), "duplicate key {key}");
            }
        }
    }
}
