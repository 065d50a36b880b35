/// Team Match Engine: Strength Reference Data
///
/// Static strength catalog and the strength → culture-trait association
/// table. Immutable. Unknown strength names simply carry no traits.

use crate::domain::{Domain, StrengthRef};

pub const CULTURE_TRAITS: [&str; 6] = [
    "care",
    "collaboration",
    "drive",
    "execution",
    "innovation",
    "rigor",
];

struct CatalogEntry {
    name: &'static str,
    domain: Domain,
    traits: &'static [&'static str],
}

const fn entry(
    name: &'static str,
    domain: Domain,
    traits: &'static [&'static str],
) -> CatalogEntry {
    CatalogEntry { name, domain, traits }
}

// Sorted by name.
static CATALOG: [CatalogEntry; 24] = [
    entry("achiever", Domain::Doing, &["drive", "execution"]),
    entry("activator", Domain::Motivating, &["drive", "innovation"]),
    entry("adaptability", Domain::Feeling, &["collaboration"]),
    entry("analytical", Domain::Thinking, &["rigor"]),
    entry("arranger", Domain::Doing, &["collaboration", "execution"]),
    entry("command", Domain::Motivating, &["drive"]),
    entry("communication", Domain::Motivating, &["collaboration"]),
    entry("competition", Domain::Motivating, &["drive"]),
    entry("context", Domain::Thinking, &["rigor"]),
    entry("deliberative", Domain::Doing, &["rigor"]),
    entry("developer", Domain::Feeling, &["care"]),
    entry("discipline", Domain::Doing, &["execution", "rigor"]),
    entry("empathy", Domain::Feeling, &["care"]),
    entry("focus", Domain::Doing, &["execution"]),
    entry("futuristic", Domain::Thinking, &["innovation"]),
    entry("harmony", Domain::Feeling, &["collaboration", "care"]),
    entry("ideation", Domain::Thinking, &["innovation"]),
    entry("includer", Domain::Feeling, &["care", "collaboration"]),
    entry("learner", Domain::Thinking, &["innovation"]),
    entry("maximizer", Domain::Motivating, &["rigor", "drive"]),
    entry("relator", Domain::Feeling, &["care"]),
    entry("responsibility", Domain::Doing, &["execution"]),
    entry("self_assurance", Domain::Motivating, &["drive"]),
    entry("strategic", Domain::Thinking, &["innovation", "rigor"]),
];

fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .binary_search_by(|e| e.name.cmp(name))
        .ok()
        .map(|idx| &CATALOG[idx])
}

/// Look up a catalog strength by its stable key.
pub fn strength(name: &str) -> Option<StrengthRef> {
    find(name).map(|e| StrengthRef::new(e.name, e.domain))
}

/// Every catalog strength, sorted by name.
pub fn catalog() -> Vec<StrengthRef> {
    CATALOG
        .iter()
        .map(|e| StrengthRef::new(e.name, e.domain))
        .collect()
}

/// Catalog strengths belonging to `domain`, sorted by name.
pub fn strengths_in(domain: Domain) -> Vec<StrengthRef> {
    CATALOG
        .iter()
        .filter(|e| e.domain == domain)
        .map(|e| StrengthRef::new(e.name, e.domain))
        .collect()
}

/// Culture traits a strength expresses.
pub fn traits_for(strength_name: &str) -> &'static [&'static str] {
    find(strength_name).map(|e| e.traits).unwrap_or(&[])
}

/// Whether `strength_name` expresses `trait_name`.
pub fn expresses(strength_name: &str, trait_name: &str) -> bool {
    traits_for(strength_name).contains(&trait_name)
}

/// Whether any catalog strength expresses `trait_name`.
pub fn is_expressible(trait_name: &str) -> bool {
    CATALOG.iter().any(|e| e.traits.contains(&trait_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_sorted_for_lookup() {
        let names: Vec<&str> = CATALOG.iter().map(|e| e.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn every_domain_has_six_strengths() {
        for domain in Domain::ALL {
            assert_eq!(strengths_in(domain).len(), 6, "{}", domain);
        }
    }

    #[test]
    fn traits_are_known() {
        for e in CATALOG.iter() {
            for t in e.traits {
                assert!(CULTURE_TRAITS.contains(t), "{} -> {}", e.name, t);
            }
        }
    }

    #[test]
    fn every_culture_trait_is_expressible() {
        for t in CULTURE_TRAITS {
            assert!(is_expressible(t), "{}", t);
        }
        assert!(!is_expressible("whimsy"));
    }

    #[test]
    fn lookup() {
        assert_eq!(
            strength("strategic"),
            Some(StrengthRef::new("strategic", Domain::Thinking))
        );
        assert_eq!(strength("unknown"), None);
        assert!(expresses("discipline", "rigor"));
        assert!(traits_for("unknown").is_empty());
    }
}
