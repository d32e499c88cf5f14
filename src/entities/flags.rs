//! Built-in country catalog with flag image references

/// A well-known country and its flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryFlag {
    pub name: &'static str,
    /// ISO 3166-1 alpha-2 code
    pub code: &'static str,
}

impl CountryFlag {
    /// Flag image URL for this country
    pub fn flag_url(&self) -> String {
        format!("https://flagcdn.com/w40/{}.png", self.code.to_ascii_lowercase())
    }
}

pub const CATALOG: &[CountryFlag] = &[
    CountryFlag { name: "United States", code: "US" },
    CountryFlag { name: "Canada", code: "CA" },
    CountryFlag { name: "United Kingdom", code: "GB" },
    CountryFlag { name: "Germany", code: "DE" },
    CountryFlag { name: "France", code: "FR" },
    CountryFlag { name: "Japan", code: "JP" },
    CountryFlag { name: "Australia", code: "AU" },
    CountryFlag { name: "Brazil", code: "BR" },
    CountryFlag { name: "India", code: "IN" },
    CountryFlag { name: "China", code: "CN" },
    CountryFlag { name: "Mexico", code: "MX" },
    CountryFlag { name: "Spain", code: "ES" },
    CountryFlag { name: "Italy", code: "IT" },
    CountryFlag { name: "Netherlands", code: "NL" },
    CountryFlag { name: "Sweden", code: "SE" },
    CountryFlag { name: "Norway", code: "NO" },
    CountryFlag { name: "South Korea", code: "KR" },
    CountryFlag { name: "Singapore", code: "SG" },
    CountryFlag { name: "Switzerland", code: "CH" },
    CountryFlag { name: "Austria", code: "AT" },
];

/// Look up a catalog entry by ISO code or by name (case-insensitive)
pub fn lookup(query: &str) -> Option<&'static CountryFlag> {
    let query = query.trim();
    CATALOG
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(query) || c.name.eq_ignore_ascii_case(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code_and_name() {
        assert_eq!(lookup("de").unwrap().name, "Germany");
        assert_eq!(lookup("south korea").unwrap().code, "KR");
        assert!(lookup("Atlantis").is_none());
    }

    #[test]
    fn test_flag_url() {
        assert_eq!(
            lookup("US").unwrap().flag_url(),
            "https://flagcdn.com/w40/us.png"
        );
    }

    #[test]
    fn test_catalog_codes_unique() {
        let mut codes: Vec<_> = CATALOG.iter().map(|c| c.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), CATALOG.len());
    }
}
