//! Heritage morphology abbreviations: French → English feature expansion.
//!
//! The Heritage engine labels analyses with compact French abbreviations
//! (`m. du. acc.`, `3 sg. pr. ac. ind.`). Each row maps one abbreviation to a
//! feature key and English value. A handful of abbreviations are ambiguous in
//! the source (`f.` is *féminin* or *faible*); those expand to every reading,
//! and the caller records the extras under suffixed keys.

/// One expansion of a morphology code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pub key: &'static str,
    pub value: &'static str,
}

const fn exp(key: &'static str, value: &'static str) -> Expansion {
    Expansion { key, value }
}

/// Expand a single morphology code. Returns every reading, primary first;
/// `None` for codes the table does not know.
pub fn expand(code: &str) -> Option<&'static [Expansion]> {
    // Codes are matched with and without the trailing period so both table
    // text and query-string variants resolve.
    let trimmed = code.trim().trim_end_matches('.');
    TABLE
        .iter()
        .find(|(abbrev, _)| *abbrev == trimmed)
        .map(|(_, expansions)| *expansions)
}

/// Whether `code` has more than one reading.
pub fn is_ambiguous(code: &str) -> bool {
    expand(code).map(|e| e.len() > 1).unwrap_or(false)
}

type Row = (&'static str, &'static [Expansion]);

static TABLE: &[Row] = &[
    // Genders.
    ("m", &[exp("gender", "masculine")]),
    ("masc", &[exp("gender", "masculine")]),
    ("masculin", &[exp("gender", "masculine")]),
    // `f.` is féminin in nominal analyses but faible (weak stem) in verbal
    // tables; both readings are preserved.
    ("f", &[exp("gender", "feminine"), exp("stem", "weak")]),
    ("fém", &[exp("gender", "feminine")]),
    ("féminin", &[exp("gender", "feminine")]),
    ("n", &[exp("gender", "neuter")]),
    ("neutre", &[exp("gender", "neuter")]),
    ("dei", &[exp("gender", "deictic")]),
    // Numbers.
    ("sg", &[exp("number", "singular")]),
    ("singulier", &[exp("number", "singular")]),
    ("du", &[exp("number", "dual")]),
    ("duel", &[exp("number", "dual")]),
    ("pl", &[exp("number", "plural")]),
    ("pluriel", &[exp("number", "plural")]),
    // Cases.
    ("nom", &[exp("case", "nominative")]),
    ("nominatif", &[exp("case", "nominative")]),
    ("acc", &[exp("case", "accusative")]),
    ("accusatif", &[exp("case", "accusative")]),
    ("i", &[exp("case", "instrumental")]),
    ("ins", &[exp("case", "instrumental")]),
    ("inst", &[exp("case", "instrumental")]),
    ("instrumental", &[exp("case", "instrumental")]),
    ("dat", &[exp("case", "dative")]),
    ("datif", &[exp("case", "dative")]),
    ("abl", &[exp("case", "ablative")]),
    ("ablatif", &[exp("case", "ablative")]),
    ("g", &[exp("case", "genitive")]),
    ("gén", &[exp("case", "genitive")]),
    ("gen", &[exp("case", "genitive")]),
    ("génitif", &[exp("case", "genitive")]),
    ("loc", &[exp("case", "locative")]),
    ("locatif", &[exp("case", "locative")]),
    ("voc", &[exp("case", "vocative")]),
    ("vocatif", &[exp("case", "vocative")]),
    // Persons.
    ("1", &[exp("person", "first")]),
    ("2", &[exp("person", "second")]),
    ("3", &[exp("person", "third")]),
    ("1st", &[exp("person", "first")]),
    ("2nd", &[exp("person", "second")]),
    ("3rd", &[exp("person", "third")]),
    ("1ère", &[exp("person", "first")]),
    ("2ème", &[exp("person", "second")]),
    ("3ème", &[exp("person", "third")]),
    // Tenses.
    ("pr", &[exp("tense", "present")]),
    ("pres", &[exp("tense", "present")]),
    ("présent", &[exp("tense", "present")]),
    ("impft", &[exp("tense", "imperfect")]),
    ("imparfait", &[exp("tense", "imperfect")]),
    ("fut", &[exp("tense", "future")]),
    ("futur", &[exp("tense", "future")]),
    ("pft", &[exp("tense", "perfect")]),
    ("parfait", &[exp("tense", "perfect")]),
    ("aor", &[exp("tense", "aorist")]),
    ("aoriste", &[exp("tense", "aorist")]),
    ("pqp", &[exp("tense", "pluperfect")]),
    ("per", &[exp("tense", "periphrastic future")]),
    // Moods. `imp.` is impératif in command rows but imparfait in some
    // conjugation tables; both readings are preserved.
    ("ind", &[exp("mood", "indicative")]),
    ("indicatif", &[exp("mood", "indicative")]),
    ("opt", &[exp("mood", "optative")]),
    ("optatif", &[exp("mood", "optative")]),
    ("imp", &[exp("mood", "imperative"), exp("tense", "imperfect")]),
    ("impératif", &[exp("mood", "imperative")]),
    ("cond", &[exp("mood", "conditional")]),
    ("conditionnel", &[exp("mood", "conditional")]),
    ("subj", &[exp("mood", "subjunctive")]),
    ("subjonctif", &[exp("mood", "subjunctive")]),
    ("inj", &[exp("mood", "injunctive")]),
    ("injonctif", &[exp("mood", "injunctive")]),
    ("prec", &[exp("mood", "precative")]),
    ("précatif", &[exp("mood", "precative")]),
    ("ben", &[exp("mood", "benedictive")]),
    ("bénédictif", &[exp("mood", "benedictive")]),
    // Voices.
    ("ac", &[exp("voice", "active")]),
    ("actif", &[exp("voice", "active")]),
    ("md", &[exp("voice", "middle")]),
    ("moy", &[exp("voice", "middle")]),
    ("moyen", &[exp("voice", "middle")]),
    ("ps", &[exp("voice", "passive")]),
    ("passif", &[exp("voice", "passive")]),
    // Non-finite forms.
    ("inf", &[exp("form", "infinitive")]),
    ("infinitif", &[exp("form", "infinitive")]),
    ("abs", &[exp("form", "absolutive")]),
    ("absolutif", &[exp("form", "absolutive")]),
    ("ppr", &[exp("form", "present participle")]),
    ("pp", &[exp("form", "past participle")]),
    ("ppft", &[exp("form", "perfect participle")]),
    ("pfp", &[exp("form", "gerundive")]),
    ("gérondif", &[exp("form", "gerundive")]),
    ("ppf", &[exp("form", "future participle")]),
    // `part.` is participe in verbal rows, particule in indeclinable rows.
    ("part", &[exp("form", "participle"), exp("pos", "particle")]),
    ("participe", &[exp("form", "participle")]),
    // Secondary conjugations.
    ("ca", &[exp("derivation", "causative")]),
    ("causatif", &[exp("derivation", "causative")]),
    ("des", &[exp("derivation", "desiderative")]),
    ("désidératif", &[exp("derivation", "desiderative")]),
    ("int", &[exp("derivation", "intensive")]),
    ("intensif", &[exp("derivation", "intensive")]),
    ("dén", &[exp("derivation", "denominative")]),
    ("dénominatif", &[exp("derivation", "denominative")]),
    // Word classes and compound positions.
    ("adj", &[exp("pos", "adjective")]),
    ("adjectif", &[exp("pos", "adjective")]),
    ("adv", &[exp("pos", "adverb")]),
    ("adverbe", &[exp("pos", "adverb")]),
    ("pron", &[exp("pos", "pronoun")]),
    ("pronom", &[exp("pos", "pronoun")]),
    ("prép", &[exp("pos", "preposition")]),
    ("préposition", &[exp("pos", "preposition")]),
    ("conj", &[exp("pos", "conjunction")]),
    ("conjonction", &[exp("pos", "conjunction")]),
    ("interj", &[exp("pos", "interjection")]),
    ("num", &[exp("pos", "numeral")]),
    ("numéral", &[exp("pos", "numeral")]),
    ("indécl", &[exp("pos", "indeclinable")]),
    ("iic", &[exp("compound", "initial")]),
    ("ifc", &[exp("compound", "final")]),
    ("iiv", &[exp("compound", "verbal initial")]),
    // Registers and strata.
    ("véd", &[exp("register", "vedic")]),
    ("védique", &[exp("register", "vedic")]),
    ("clas", &[exp("register", "classical")]),
    ("classique", &[exp("register", "classical")]),
    ("ép", &[exp("register", "epic")]),
    ("épique", &[exp("register", "epic")]),
    // Stem grades.
    ("fort", &[exp("stem", "strong")]),
    ("faible", &[exp("stem", "weak")]),
    ("moy-grade", &[exp("stem", "middle")]),
    // Comparison.
    ("compar", &[exp("degree", "comparative")]),
    ("comparatif", &[exp("degree", "comparative")]),
    ("superl", &[exp("degree", "superlative")]),
    ("superlatif", &[exp("degree", "superlative")]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_and_bare_codes_both_resolve() {
        assert_eq!(expand("m.").unwrap()[0], exp("gender", "masculine"));
        assert_eq!(expand("m").unwrap()[0], exp("gender", "masculine"));
        assert_eq!(expand("acc.").unwrap()[0], exp("case", "accusative"));
    }

    #[test]
    fn ambiguous_codes_expand_to_all_readings() {
        let readings = expand("f.").unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0], exp("gender", "feminine"));
        assert_eq!(readings[1], exp("stem", "weak"));
        assert!(is_ambiguous("f."));
        assert!(is_ambiguous("imp."));
        assert!(!is_ambiguous("m."));
    }

    #[test]
    fn unknown_codes_return_none() {
        assert_eq!(expand("zz."), None);
    }

    #[test]
    fn french_full_words_resolve() {
        assert_eq!(expand("génitif").unwrap()[0], exp("case", "genitive"));
        assert_eq!(expand("aoriste").unwrap()[0], exp("tense", "aorist"));
    }
}
