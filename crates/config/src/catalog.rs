//! City and outlet catalog
//!
//! Closed relation of cities to their outlets, with the keywords used to
//! recognize each in free text. Order matters: the first city (and the first
//! outlet within a city) whose keyword appears in a message wins.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCatalog {
    pub cities: Vec<CityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEntry {
    /// Value stored in the booking context
    pub id: String,
    pub display_name: String,
    /// Lowercase substrings that select this city; aliases normalize to `id`
    pub keywords: Vec<String>,
    pub outlets: Vec<OutletEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletEntry {
    pub id: String,
    pub display_name: String,
    pub keywords: Vec<String>,
    /// Sentence spoken when the outlet is picked
    #[serde(default)]
    pub selection_note: String,
}

impl CityCatalog {
    /// Load from a YAML file and validate
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::FileNotFound(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let catalog: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cities.is_empty() {
            return Err(invalid("cities", "At least one city is required"));
        }

        let mut city_ids = HashSet::new();
        for city in &self.cities {
            if !city_ids.insert(city.id.as_str()) {
                return Err(invalid("cities", format!("Duplicate city id '{}'", city.id)));
            }
            check_keywords(&format!("cities.{}.keywords", city.id), &city.keywords)?;
            if city.outlets.is_empty() {
                return Err(invalid(
                    &format!("cities.{}.outlets", city.id),
                    "Every city needs at least one outlet",
                ));
            }

            let mut outlet_ids = HashSet::new();
            for outlet in &city.outlets {
                if !outlet_ids.insert(outlet.id.as_str()) {
                    return Err(invalid(
                        &format!("cities.{}.outlets", city.id),
                        format!("Duplicate outlet id '{}'", outlet.id),
                    ));
                }
                check_keywords(
                    &format!("cities.{}.outlets.{}.keywords", city.id, outlet.id),
                    &outlet.keywords,
                )?;
            }
        }

        Ok(())
    }

    pub fn city(&self, id: &str) -> Option<&CityEntry> {
        self.cities.iter().find(|c| c.id == id)
    }

    /// Display names joined for prompts, e.g. "Delhi or Bangalore"
    pub fn city_names(&self, conjunction: &str) -> String {
        join_names(
            self.cities.iter().map(|c| c.display_name.as_str()),
            conjunction,
        )
    }
}

impl CityEntry {
    pub fn outlet(&self, id: &str) -> Option<&OutletEntry> {
        self.outlets.iter().find(|o| o.id == id)
    }

    /// e.g. "Connaught Place, Vasant Kunj, and Janakpuri"
    pub fn outlet_names(&self) -> String {
        join_names(self.outlets.iter().map(|o| o.display_name.as_str()), "and")
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self {
            cities: vec![
                CityEntry {
                    id: "delhi".to_string(),
                    display_name: "Delhi".to_string(),
                    keywords: keywords(&["delhi"]),
                    outlets: vec![
                        outlet(
                            "connaught_place",
                            "Connaught Place",
                            &["connaught", "cp"],
                            "Great choice! Connaught Place outlet is very popular.",
                        ),
                        outlet(
                            "vasant_kunj",
                            "Vasant Kunj",
                            &["vasant"],
                            "Excellent! Vasant Kunj outlet has a modern ambiance.",
                        ),
                        outlet(
                            "janakpuri",
                            "Janakpuri",
                            &["janakpuri"],
                            "Perfect! Janakpuri outlet is located in Unity Mall.",
                        ),
                    ],
                },
                CityEntry {
                    id: "bangalore".to_string(),
                    display_name: "Bangalore".to_string(),
                    keywords: keywords(&["bangalore", "bengaluru"]),
                    outlets: vec![
                        outlet(
                            "indiranagar",
                            "Indiranagar",
                            &["indiranagar"],
                            "Great choice! Indiranagar outlet is one of our most popular.",
                        ),
                        outlet(
                            "jp_nagar",
                            "JP Nagar",
                            &["jp", "jayanagar"],
                            "Excellent! JP Nagar outlet is located on the 3rd floor.",
                        ),
                        outlet(
                            "electronic_city",
                            "Electronic City",
                            &["electronic"],
                            "Perfect! Electronic City outlet is convenient for IT professionals.",
                        ),
                        outlet(
                            "koramangala",
                            "Koramangala",
                            &["koramangala"],
                            "Great choice! Koramangala outlet is very popular.",
                        ),
                    ],
                },
            ],
        }
    }
}

fn outlet(id: &str, display_name: &str, kws: &[&str], note: &str) -> OutletEntry {
    OutletEntry {
        id: id.to_string(),
        display_name: display_name.to_string(),
        keywords: keywords(kws),
        selection_note: note.to_string(),
    }
}

fn keywords(kws: &[&str]) -> Vec<String> {
    kws.iter().map(|k| k.to_string()).collect()
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn check_keywords(field: &str, keywords: &[String]) -> Result<(), ConfigError> {
    if keywords.is_empty() {
        return Err(invalid(field, "At least one keyword is required"));
    }
    for kw in keywords {
        if kw.trim().is_empty() || *kw != kw.to_lowercase() {
            return Err(invalid(
                field,
                format!("Keyword '{}' must be non-empty lowercase", kw),
            ));
        }
    }
    Ok(())
}

/// "A", "A or B", "A, B, or C"
fn join_names<'a>(names: impl Iterator<Item = &'a str>, conjunction: &str) -> String {
    let names: Vec<&str> = names.collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} {} {}", first, conjunction, second),
        [head @ .., last] => format!("{}, {} {}", head.join(", "), conjunction, last),
    }
}
