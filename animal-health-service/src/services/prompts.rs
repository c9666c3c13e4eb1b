//! Prompt and fallback text construction.
//!
//! Everything here is a pure function of the request fields. Lists are
//! joined with `", "` and rendered in input order.

use crate::dtos::LocationData;

fn join(items: &[String]) -> String {
    items.join(", ")
}

pub fn health_analysis_prompt(species: &str, symptoms: &[String]) -> String {
    format!(
        "Analyze the health condition of a {} with symptoms: {}. Provide diagnosis and recommendations.",
        species,
        join(symptoms)
    )
}

pub fn health_analysis_fallback(species: &str, symptoms: &[String]) -> String {
    format!("Analysis for {}: Symptoms detected - {}", species, join(symptoms))
}

/// Location is rendered from most to least specific: commune, department, region.
pub fn treatment_prompt(species: &str, diseases: &[String], location: &LocationData) -> String {
    format!(
        "Generate a detailed treatment plan for a {} with {}. Location: {}, {}, {}.",
        species,
        join(diseases),
        location.commune,
        location.department,
        location.region
    )
}

pub fn treatment_fallback(diseases: &[String], location: &LocationData) -> String {
    format!(
        "Treatment plan generated for {} in {}",
        join(diseases),
        location.commune
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn location() -> LocationData {
        LocationData {
            region: "R".to_string(),
            department: "D".to_string(),
            commune: "C".to_string(),
        }
    }

    #[test]
    fn health_prompt_joins_symptoms_in_order() {
        assert_eq!(
            health_analysis_prompt("cattle", &strings(&["fever", "cough"])),
            "Analyze the health condition of a cattle with symptoms: fever, cough. Provide diagnosis and recommendations."
        );
    }

    #[test]
    fn health_fallback_matches_template() {
        assert_eq!(
            health_analysis_fallback("cattle", &strings(&["fever", "cough"])),
            "Analysis for cattle: Symptoms detected - fever, cough"
        );
    }

    #[test]
    fn empty_symptom_list_renders_empty() {
        assert_eq!(
            health_analysis_fallback("pig", &[]),
            "Analysis for pig: Symptoms detected - "
        );
    }

    #[test]
    fn treatment_prompt_orders_location_commune_first() {
        assert_eq!(
            treatment_prompt("goat", &strings(&["foot rot", "mastitis"]), &location()),
            "Generate a detailed treatment plan for a goat with foot rot, mastitis. Location: C, D, R."
        );
    }

    #[test]
    fn treatment_fallback_names_commune() {
        assert_eq!(
            treatment_fallback(&strings(&["foot rot"]), &location()),
            "Treatment plan generated for foot rot in C"
        );
    }
}
