//! Flag resolver: maps emoji flag reactions to the language they request.
//!
//! Reactions arrive either in canonical form (`flag-jp`) or as a bare
//! country code (`jp`). A handful of flags are recognized but deliberately
//! map to an empty name (disputed territories, non-language flags); callers
//! report those as unsupported instead of ignoring them.

use std::collections::HashMap;
use std::sync::OnceLock;

const FLAG_PREFIX: &str = "flag-";

/// Canonical flag code → target language name.
pub static FLAG_LANGUAGES: &[(&str, &str)] = &[
    ("flag-ac", "English"),
    ("flag-ad", "Catalan"),
    ("flag-ae", "Arabic"),
    ("flag-af", "Pashto"),
    ("flag-ag", "English"),
    ("flag-ai", "English"),
    ("flag-al", "Albanian"),
    ("flag-am", "Armenian"),
    ("flag-ao", "Portuguese"),
    ("flag-aq", ""),
    ("flag-ar", "Spanish"),
    ("flag-as", "English"),
    ("flag-at", "German"),
    ("flag-au", "English"),
    ("flag-aw", "Dutch"),
    ("flag-ax", "Swedish"),
    ("flag-az", "Azerbaijani"),
    ("flag-ba", "Bosnian"),
    ("flag-bb", "English"),
    ("flag-bd", "Bengali"),
    ("flag-be", "Dutch"),
    ("flag-bf", "French"),
    ("flag-bg", "Bulgarian"),
    ("flag-bh", "Arabic"),
    ("flag-bi", "French"),
    ("flag-bj", "French"),
    ("flag-bl", "French"),
    ("flag-bm", "English"),
    ("flag-bn", "English"),
    ("flag-bo", "Spanish"),
    ("flag-bq", "Dutch"),
    ("flag-br", "Portuguese"),
    ("flag-bs", "English"),
    ("flag-bt", "Dzongkha"),
    ("flag-bv", "Norwegian"),
    ("flag-bw", "English"),
    ("flag-by", "Belarusian"),
    ("flag-bz", "English"),
    ("flag-ca", "English"),
    ("flag-cc", "Malay"),
    ("flag-cd", "French"),
    ("flag-cf", "French"),
    ("flag-cg", "French"),
    ("flag-ch", "German"),
    ("flag-ci", "French"),
    ("flag-ck", "English"),
    ("flag-cl", "Spanish"),
    ("flag-cm", "French"),
    ("flag-cn", "Chinese Simplified"),
    ("flag-co", "Spanish"),
    ("flag-cp", "French"),
    ("flag-cr", "Spanish"),
    ("flag-cu", "Spanish"),
    ("flag-cv", "Portuguese"),
    ("flag-cw", "Dutch"),
    ("flag-cx", "English"),
    ("flag-cy", "Greek"),
    ("flag-cz", "Czech"),
    ("flag-de", "German"),
    ("flag-dg", "English"),
    ("flag-dj", "French"),
    ("flag-dk", "Danish"),
    ("flag-dm", "English"),
    ("flag-do", "Spanish"),
    ("flag-dz", "Arabic"),
    ("flag-ea", "Spanish"),
    ("flag-ec", "Spanish"),
    ("flag-ee", "Estonian"),
    ("flag-eg", "Arabic"),
    ("flag-eh", "Arabic"),
    ("flag-er", "Arabic"),
    ("flag-es", "Spanish"),
    ("flag-et", "Oromo"),
    ("flag-eu", ""),
    ("flag-fi", "Finnish"),
    ("flag-fj", "English"),
    ("flag-fk", "English"),
    ("flag-fm", "English"),
    ("flag-fo", "Faroese"),
    ("flag-fr", "French"),
    ("flag-ga", "French"),
    ("flag-gb", "English"),
    ("flag-gd", "English"),
    ("flag-ge", "Georgian"),
    ("flag-gf", "French"),
    ("flag-gg", "English"),
    ("flag-gh", "English"),
    ("flag-gi", "English"),
    ("flag-gl", "Danish"),
    ("flag-gm", "English"),
    ("flag-gn", "French"),
    ("flag-gp", "French"),
    ("flag-gq", "Spanish"),
    ("flag-gr", "Greek"),
    ("flag-gs", "English"),
    ("flag-gt", "Spanish"),
    ("flag-gu", "English"),
    ("flag-gw", "Portuguese"),
    ("flag-gy", "English"),
    ("flag-hk", "Chinese Traditional"),
    ("flag-hm", ""),
    ("flag-hn", "Spanish"),
    ("flag-hr", "Croatian"),
    ("flag-ht", "Haitian Creole"),
    ("flag-hu", "Hungarian"),
    ("flag-ic", "Spanish"),
    ("flag-id", "Indonesian"),
    ("flag-ie", "Irish"),
    ("flag-il", "Hebrew"),
    ("flag-im", "English"),
    ("flag-in", "Hindi"),
    ("flag-io", "English"),
    ("flag-iq", "Arabic"),
    ("flag-ir", "Persian"),
    ("flag-is", "Icelandic"),
    ("flag-it", "Italian"),
    ("flag-je", "English"),
    ("flag-jm", "English"),
    ("flag-jo", "Arabic"),
    ("flag-jp", "Japanese"),
    ("flag-ke", "English"),
    ("flag-kg", "Kyrgyz"),
    ("flag-kh", "Khmer"),
    ("flag-ki", "English"),
    ("flag-km", ""),
    ("flag-kn", "English"),
    ("flag-kp", "Korean"),
    ("flag-kr", "Korean"),
    ("flag-kw", "Arabic"),
    ("flag-ky", "English"),
    ("flag-kz", "Kazakh"),
    ("flag-la", "Lao"),
    ("flag-lb", "Arabic"),
    ("flag-lc", "English"),
    ("flag-li", "German"),
    ("flag-lk", "Sinhala"),
    ("flag-lr", "English"),
    ("flag-ls", "Sesotho"),
    ("flag-lt", "Lithuanian"),
    ("flag-lu", "Luxembourgish"),
    ("flag-lv", "Latvian"),
    ("flag-ly", "Arabic"),
    ("flag-ma", "Arabic"),
    ("flag-mc", "French"),
    ("flag-md", "Romanian"),
    ("flag-me", ""),
    ("flag-mf", "French"),
    ("flag-mg", "Malagasy"),
    ("flag-mh", "Marshallese"),
    ("flag-mk", "Macedonian"),
    ("flag-ml", "French"),
    ("flag-mm", "Burmese"),
    ("flag-mn", "Mongolian"),
    ("flag-mo", "Chinese Traditional"),
    ("flag-mp", "English"),
    ("flag-mq", "French"),
    ("flag-mr", "Arabic"),
    ("flag-ms", "English"),
    ("flag-mt", "Maltese"),
    ("flag-mu", "English"),
    ("flag-mv", "Dhivehi"),
    ("flag-mw", "English"),
    ("flag-mx", "Spanish"),
    ("flag-my", "Malay"),
    ("flag-mz", "Portuguese"),
    ("flag-na", "English"),
    ("flag-nc", "French"),
    ("flag-ne", "French"),
    ("flag-nf", "English"),
    ("flag-ng", "English"),
    ("flag-ni", "Spanish"),
    ("flag-nl", "Dutch"),
    ("flag-no", "Norwegian"),
    ("flag-np", "Nepali"),
    ("flag-nr", "Nauruan"),
    ("flag-nu", "Niuean"),
    ("flag-nz", "English"),
    ("flag-om", "Arabic"),
    ("flag-pa", "Spanish"),
    ("flag-pe", "Spanish"),
    ("flag-pf", "French"),
    ("flag-pg", "English"),
    ("flag-ph", "Tagalog"),
    ("flag-pk", "Urdu"),
    ("flag-pl", "Polish"),
    ("flag-pm", "French"),
    ("flag-pn", "English"),
    ("flag-pr", "Spanish"),
    ("flag-ps", "Arabic"),
    ("flag-pt", "Portuguese"),
    ("flag-pw", "English"),
    ("flag-py", "Spanish"),
    ("flag-qa", "Arabic"),
    ("flag-re", "French"),
    ("flag-ro", "Romanian"),
    ("flag-rs", "Serbian"),
    ("flag-ru", "Russian"),
    ("flag-rw", "Kinyarwanda"),
    ("flag-sa", "Arabic"),
    ("flag-sb", "English"),
    ("flag-sc", "English"),
    ("flag-sd", "Arabic"),
    ("flag-se", "Swedish"),
    ("flag-sg", "English"),
    ("flag-sh", "English"),
    ("flag-si", "Slovenian"),
    ("flag-sj", "Norwegian"),
    ("flag-sk", "Slovak"),
    ("flag-sl", "English"),
    ("flag-sm", "Italian"),
    ("flag-sn", "French"),
    ("flag-so", "Somali"),
    ("flag-sr", "Dutch"),
    ("flag-ss", "English"),
    ("flag-st", "Portuguese"),
    ("flag-sv", "Spanish"),
    ("flag-sw", "Arabic"),
    ("flag-sx", "Dutch"),
    ("flag-sz", "Swati"),
    ("flag-ta", "English"),
    ("flag-tc", "English"),
    ("flag-td", "French"),
    ("flag-tf", "French"),
    ("flag-tg", "French"),
    ("flag-th", "Thai"),
    ("flag-tj", "Tajik"),
    ("flag-tk", "Tokelau"),
    ("flag-tl", "Tetum"),
    ("flag-tm", "Turkmen"),
    ("flag-tn", "Arabic"),
    ("flag-to", ""),
    ("flag-tr", "Turkish"),
    ("flag-tt", "English"),
    ("flag-tv", "Tuvaluan"),
    ("flag-tw", "Chinese Traditional"),
    ("flag-tz", "Swahili"),
    ("flag-ua", "Ukrainian"),
    ("flag-ug", "English"),
    ("flag-um", "English"),
    ("flag-us", "English"),
    ("flag-uy", "Spanish"),
    ("flag-uz", "Uzbek"),
    ("flag-va", "Italian"),
    ("flag-vc", "English"),
    ("flag-ve", "Spanish"),
    ("flag-vg", "English"),
    ("flag-vi", "English"),
    ("flag-vn", "Vietnamese"),
    ("flag-vu", "English"),
    ("flag-wf", "French"),
    ("flag-ws", "Samoan"),
    ("flag-xk", "Albanian"),
    ("flag-ye", "Arabic"),
    ("flag-yt", "French"),
    ("flag-za", "Afrikaans"),
    ("flag-zm", "English"),
    ("flag-zw", "English"),
];

struct FlagTables {
    canonical: HashMap<&'static str, &'static str>,
    alias: HashMap<&'static str, &'static str>,
}

static TABLES: OnceLock<FlagTables> = OnceLock::new();

fn tables() -> &'static FlagTables {
    TABLES.get_or_init(|| {
        let canonical: HashMap<_, _> = FLAG_LANGUAGES.iter().copied().collect();
        let alias = FLAG_LANGUAGES
            .iter()
            .map(|(code, name)| (code.strip_prefix(FLAG_PREFIX).unwrap_or(code), *name))
            .collect();
        FlagTables { canonical, alias }
    })
}

/// Resolve a reaction name to a target language.
///
/// Returns:
/// * `None` if the reaction is not a known flag at all
/// * `Some("")` if the flag is known but has no language
/// * `Some(name)` otherwise
pub fn resolve(flag_code: &str) -> Option<&'static str> {
    let tables = tables();
    tables
        .canonical
        .get(flag_code)
        .or_else(|| tables.alias.get(flag_code))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Lookup Tests ====================

    #[test]
    fn test_resolve_canonical() {
        assert_eq!(resolve("flag-jp"), Some("Japanese"));
        assert_eq!(resolve("flag-fr"), Some("French"));
        assert_eq!(resolve("flag-cn"), Some("Chinese Simplified"));
        assert_eq!(resolve("flag-sw"), Some("Arabic"));
    }

    #[test]
    fn test_resolve_alias() {
        assert_eq!(resolve("jp"), Some("Japanese"));
        assert_eq!(resolve("de"), Some("German"));
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(resolve("thumbsup"), None);
        assert_eq!(resolve("flag-zz"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_resolve_unmapped_flag_is_found_but_empty() {
        assert_eq!(resolve("flag-to"), Some(""));
        assert_eq!(resolve("to"), Some(""));
        assert_eq!(resolve("flag-me"), Some(""));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        assert_eq!(resolve("FLAG-JP"), None);
    }

    // ==================== Table Tests ====================

    #[test]
    fn test_table_has_no_duplicate_codes() {
        let unique: std::collections::HashSet<_> =
            FLAG_LANGUAGES.iter().map(|(code, _)| code).collect();
        assert_eq!(unique.len(), FLAG_LANGUAGES.len());
    }

    #[test]
    fn test_table_codes_are_prefixed() {
        assert!(FLAG_LANGUAGES
            .iter()
            .all(|(code, _)| code.starts_with(FLAG_PREFIX) && code.len() == 7));
    }

    proptest! {
        #[test]
        fn test_canonical_and_alias_agree(index in 0..FLAG_LANGUAGES.len()) {
            let (code, name) = FLAG_LANGUAGES[index];
            let suffix = code.strip_prefix(FLAG_PREFIX).unwrap();
            prop_assert_eq!(resolve(code), Some(name));
            prop_assert_eq!(resolve(suffix), Some(name));
        }

        #[test]
        fn test_non_flag_names_resolve_to_none(name in "[a-z_]{3,12}") {
            prop_assume!(!name.starts_with(FLAG_PREFIX));
            prop_assert_eq!(resolve(&name), None);
        }
    }
}
