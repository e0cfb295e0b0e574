//! Gazetteer matching
//!
//! Case-insensitive substring containment against two disjoint tables:
//! localities of the local market and well-known foreign localities. When a
//! text contains entries from both tables the local table wins.

use std::collections::HashSet;

/// Saudi Arabia: transliteration variants and Arabic script.
///
/// Entries that occur inside common unrelated words are left out (`Hail`
/// would match "Thailand", `Arar` would match "Ararat").
const LOCAL_LOCALITIES: &[&str] = &[
    "saudi arabia",
    "riyadh",
    "jeddah",
    "jiddah",
    "mecca",
    "makkah",
    "medina",
    "madinah",
    "dammam",
    "khobar",
    "dhahran",
    "taif",
    "tabuk",
    "abha",
    "khamis mushait",
    "buraidah",
    "buraydah",
    "unaizah",
    "ha'il",
    "hayil",
    "jazan",
    "jizan",
    "najran",
    "yanbu",
    "jubail",
    "hofuf",
    "al ahsa",
    "al-ahsa",
    "qatif",
    "al kharj",
    "sakaka",
    "al baha",
    "al ula",
    "neom",
    "الرياض",
    "جدة",
    "مكة",
    "المدينة المنورة",
    "الدمام",
    "الخبر",
    "الطائف",
    "تبوك",
    "أبها",
];

const GLOBAL_LOCALITIES: &[&str] = &[
    "nairobi",
    "mombasa",
    "kisumu",
    "dubai",
    "abu dhabi",
    "sharjah",
    "doha",
    "manama",
    "kuwait city",
    "muscat",
    "cairo",
    "alexandria",
    "amman",
    "beirut",
    "istanbul",
    "london",
    "paris",
    "berlin",
    "new york",
    "los angeles",
    "toronto",
    "mumbai",
    "delhi",
    "karachi",
    "lahore",
    "islamabad",
    "dhaka",
    "manila",
    "jakarta",
    "kuala lumpur",
    "singapore",
    "lagos",
    "johannesburg",
    "addis ababa",
    "khartoum",
    "casablanca",
    "tunis",
    "دبي",
    "القاهرة",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GazetteerMatch {
    /// Contains a local-market locality (the matched entry)
    MatchedLocal(String),
    /// Contains a foreign locality and no local one
    MatchedGlobal(String),
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct Gazetteer {
    local: Vec<String>,
    global: Vec<String>,
}

impl Gazetteer {
    /// Build from custom tables. Entries are trimmed and lowercased; blanks
    /// and duplicates are dropped, and an entry present in both tables stays
    /// only in the local one.
    pub fn new<L, G>(local: L, global: G) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let local = normalize_entries(local);
        let local_set: HashSet<&str> = local.iter().map(String::as_str).collect();
        let global = normalize_entries(global)
            .into_iter()
            .filter(|entry| !local_set.contains(entry.as_str()))
            .collect();

        Self { local, global }
    }

    /// Built-in tables extended with configured entries
    pub fn with_extra<L, G>(extra_local: L, extra_global: G) -> Self
    where
        L: IntoIterator,
        L::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let local: Vec<String> = LOCAL_LOCALITIES
            .iter()
            .map(|s| s.to_string())
            .chain(extra_local.into_iter().map(|s| s.as_ref().to_string()))
            .collect();
        let global: Vec<String> = GLOBAL_LOCALITIES
            .iter()
            .map(|s| s.to_string())
            .chain(extra_global.into_iter().map(|s| s.as_ref().to_string()))
            .collect();
        Self::new(local, global)
    }

    pub fn match_text(&self, text: &str) -> GazetteerMatch {
        let haystack = text.trim().to_lowercase();
        if haystack.is_empty() {
            return GazetteerMatch::NoMatch;
        }

        if let Some(entry) = self.local.iter().find(|e| haystack.contains(e.as_str())) {
            return GazetteerMatch::MatchedLocal(entry.clone());
        }
        if let Some(entry) = self.global.iter().find(|e| haystack.contains(e.as_str())) {
            return GazetteerMatch::MatchedGlobal(entry.clone());
        }
        GazetteerMatch::NoMatch
    }

    pub fn local_entries(&self) -> &[String] {
        &self.local
    }

    pub fn global_entries(&self) -> &[String] {
        &self.global
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::new(LOCAL_LOCALITIES, GLOBAL_LOCALITIES)
    }
}

fn normalize_entries<I>(entries: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_disjoint() {
        let g = Gazetteer::default();
        let local: HashSet<&String> = g.local_entries().iter().collect();
        assert!(g.global_entries().iter().all(|e| !local.contains(e)));
        assert_eq!(g.local_entries().len(), LOCAL_LOCALITIES.len());
        assert_eq!(g.global_entries().len(), GLOBAL_LOCALITIES.len());
    }

    #[test]
    fn every_local_entry_matches_itself_in_any_case() {
        let g = Gazetteer::default();
        for entry in LOCAL_LOCALITIES {
            assert!(
                matches!(g.match_text(&entry.to_uppercase()), GazetteerMatch::MatchedLocal(_)),
                "{} should match local",
                entry
            );
        }
    }

    #[test]
    fn every_global_entry_matches_global() {
        let g = Gazetteer::default();
        for entry in GLOBAL_LOCALITIES {
            assert!(
                matches!(g.match_text(entry), GazetteerMatch::MatchedGlobal(_)),
                "{} should match global",
                entry
            );
        }
    }

    #[test]
    fn substring_containment() {
        let g = Gazetteer::default();
        assert_eq!(
            g.match_text("King Fahd Rd, Olaya, Riyadh 12214"),
            GazetteerMatch::MatchedLocal("riyadh".into())
        );
        assert_eq!(
            g.match_text("Westlands, NAIROBI"),
            GazetteerMatch::MatchedGlobal("nairobi".into())
        );
    }

    #[test]
    fn local_wins_when_both_match() {
        let g = Gazetteer::default();
        assert!(matches!(
            g.match_text("Jeddah Street, Dubai"),
            GazetteerMatch::MatchedLocal(_)
        ));
    }

    #[test]
    fn unknown_places_do_not_match() {
        let g = Gazetteer::default();
        assert_eq!(g.match_text("Naivasha"), GazetteerMatch::NoMatch);
        assert_eq!(g.match_text("Bangkok, Thailand"), GazetteerMatch::NoMatch);
        assert_eq!(g.match_text("   "), GazetteerMatch::NoMatch);
    }

    #[test]
    fn custom_tables_drop_overlap_from_global() {
        let g = Gazetteer::new(["Springfield", " "], ["springfield", "Shelbyville"]);
        assert_eq!(g.local_entries(), &["springfield".to_string()]);
        assert_eq!(g.global_entries(), &["shelbyville".to_string()]);
    }

    #[test]
    fn extra_entries_extend_builtins() {
        let g = Gazetteer::with_extra(["Diriyah"], ["Zanzibar"]);
        assert!(matches!(g.match_text("diriyah"), GazetteerMatch::MatchedLocal(_)));
        assert!(matches!(g.match_text("Stone Town, Zanzibar"), GazetteerMatch::MatchedGlobal(_)));
        assert!(matches!(g.match_text("Riyadh"), GazetteerMatch::MatchedLocal(_)));
    }
}
