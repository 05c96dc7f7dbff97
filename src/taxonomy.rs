//! The static training taxonomy (Ausbildungskategorien).
//!
//! A read-only tree of curriculum categories, built once and shared by every
//! session. Categories hold sections; a section holds either child sections
//! or leaf checklist items, never both. A leaf item is addressed by
//! `(category key, subcategory, item)` where `subcategory` is the section key
//! path from the category root joined with `_`.

use std::sync::OnceLock;

use serde::Serialize;

/// A top-level curriculum stage (Grundstufe, Reife- und Teststufe, ...).
#[derive(Debug, Clone, Serialize)]
pub struct TrainingCategory {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<&'static str>,
    /// Display color for the category header.
    pub color: &'static str,
    pub sections: Vec<TrainingSection>,
}

/// A node below the category level: either a branch of further sections or a
/// leaf carrying checklist items.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSection {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(flatten)]
    pub body: SectionBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SectionBody {
    Branch { sections: Vec<TrainingSection> },
    Leaf { items: Vec<&'static str> },
}

fn leaf(key: &'static str, name: &'static str, items: &[&'static str]) -> TrainingSection {
    TrainingSection {
        key,
        name,
        body: SectionBody::Leaf {
            items: items.to_vec(),
        },
    }
}

fn branch(key: &'static str, name: &'static str, sections: Vec<TrainingSection>) -> TrainingSection {
    TrainingSection {
        key,
        name,
        body: SectionBody::Branch { sections },
    }
}

fn build() -> Vec<TrainingCategory> {
    vec![
        TrainingCategory {
            key: "grundstufe",
            name: "Grundstufe",
            subtitle: Some("Einweisung und Bedienung"),
            color: "#F59E0B",
            sections: vec![
                leaf(
                    "besonderheiten_einsteigen",
                    "Besonderheiten beim Einsteigen",
                    &["Besonderheiten beim Einsteigen"],
                ),
                leaf(
                    "einstellen",
                    "Einstellen",
                    &["Sitz", "Spiegel", "Lenkrad", "Kopfstütze"],
                ),
                leaf("lenkradhaltung", "Lenkradhaltung", &["Lenkradhaltung"]),
                leaf("pedale", "Pedale", &["Pedale"]),
                leaf("gurt_anlegen", "Gurt anlegen/anpassen", &["Gurt anlegen/anpassen"]),
                leaf("schalt_wahlhebel", "Schalt-/Wählhebel", &["Schalt-/Wählhebel"]),
                leaf("zundschloss", "Zündschloss", &["Zündschloss"]),
                leaf("motor_anlassen", "Motor anlassen", &["Motor anlassen"]),
                leaf(
                    "anfahren",
                    "Anfahren/Anhalteübungen",
                    &["Anfahren/Anhalteübungen"],
                ),
                leaf(
                    "schaltubungen",
                    "Schaltübungen (umweltschonend)",
                    &[
                        "hoch: 1-2",
                        "2-3",
                        "3-4",
                        "...",
                        "runter: 4-3",
                        "3-2",
                        "2-1",
                        "...",
                        "runter: 4-2",
                        "4-1",
                        "3-1",
                    ],
                ),
                leaf("lenkubungen", "Lenkübungen", &["Lenkübungen"]),
            ],
        },
        TrainingCategory {
            key: "situative_bausteine",
            name: "Situative Bausteine",
            subtitle: None,
            color: "#60A5FA",
            sections: vec![branch(
                "fahrtechnische_vorbereitung",
                "Checkliste zur fahrtechnischen Vorbereitung",
                vec![
                    leaf(
                        "fahrzeug",
                        "Beim Fahrzeug",
                        &["Reifen (z.B. Beschädigungen, Profiltiefe, Reifendruck)"],
                    ),
                    leaf(
                        "scheiben_leuchten",
                        "Scheiben, Leuchten, Blinker, Hupe",
                        &["Ein- und Ausschalten"],
                    ),
                    leaf(
                        "funktion_prufen",
                        "Funktion prüfen",
                        &[
                            "Standlicht",
                            "Abblendlicht",
                            "Fernlicht",
                            "Schlussleucht m. Kennzeichenbeleuchtung",
                            "Nebelschlussleuchte",
                            "Warnblinkanlage",
                            "Blinker",
                            "Hupe",
                            "Bremsleuchte",
                        ],
                    ),
                ],
            )],
        },
        TrainingCategory {
            key: "fahrerassistenzsysteme",
            name: "Fahrerassistenzsysteme",
            subtitle: None,
            color: "#60A5FA",
            sections: vec![leaf(
                "bedienung",
                "Bedienung der Fahrerassistenzsysteme",
                &["Bedienung der Fahrerassistenzsysteme"],
            )],
        },
        TrainingCategory {
            key: "reife_teststufe",
            name: "Reife- und Teststufe",
            subtitle: Some("Abschluss der Ausbildung - Prüfungsvorbereitung"),
            color: "#10B981",
            sections: vec![
                leaf(
                    "selbststandiges_fahren",
                    "Selbstständiges Fahren",
                    &["innerorts", "außerorts"],
                ),
                leaf(
                    "verantwortungsbewusstes_fahren",
                    "Verantwortungsbewusstes Fahren",
                    &["Verantwortungsbewusstes Fahren"],
                ),
                leaf(
                    "testfahrt",
                    "Testfahrt unter Prüfungsbedingungen",
                    &["FAKT", "andere"],
                ),
            ],
        },
    ]
}

/// The shared taxonomy, built on first use.
pub fn training_categories() -> &'static [TrainingCategory] {
    static TREE: OnceLock<Vec<TrainingCategory>> = OnceLock::new();
    TREE.get_or_init(build)
}

pub fn find_category(key: &str) -> Option<&'static TrainingCategory> {
    training_categories().iter().find(|c| c.key == key)
}

/// Whether `(category, subcategory, item)` names a real checklist leaf.
pub fn contains_item(category: &str, subcategory: &str, item: &str) -> bool {
    find_category(category)
        .map(|c| {
            c.leaf_items()
                .iter()
                .any(|(path, label)| path == subcategory && *label == item)
        })
        .unwrap_or(false)
}

impl TrainingCategory {
    /// All checklist leaves under this category as
    /// `(subcategory path, item label)` pairs, in tree order.
    pub fn leaf_items(&self) -> Vec<(String, &'static str)> {
        let mut out = Vec::new();
        for section in &self.sections {
            collect_leaves(section, section.key.to_string(), &mut out);
        }
        out
    }
}

fn collect_leaves(
    section: &TrainingSection,
    path: String,
    out: &mut Vec<(String, &'static str)>,
) {
    match &section.body {
        SectionBody::Leaf { items } => {
            for item in items {
                out.push((path.clone(), item));
            }
        }
        SectionBody::Branch { sections } => {
            for child in sections {
                collect_leaves(child, format!("{}_{}", path, child.key), out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_top_level_categories() {
        let keys: Vec<_> = training_categories().iter().map(|c| c.key).collect();
        assert_eq!(
            keys,
            vec![
                "grundstufe",
                "situative_bausteine",
                "fahrerassistenzsysteme",
                "reife_teststufe"
            ]
        );
    }

    #[test]
    fn nested_sections_join_keys_with_underscore() {
        let category = find_category("situative_bausteine").unwrap();
        let leaves = category.leaf_items();
        assert!(leaves
            .iter()
            .any(|(path, item)| path == "fahrtechnische_vorbereitung_funktion_prufen"
                && *item == "Fernlicht"));
    }

    #[test]
    fn contains_item_rejects_unknown_triples() {
        assert!(contains_item("grundstufe", "einstellen", "Spiegel"));
        assert!(!contains_item("grundstufe", "einstellen", "Heckspoiler"));
        assert!(!contains_item("oberstufe", "einstellen", "Spiegel"));
    }

    #[test]
    fn serializes_branches_and_leaves_distinctly() {
        let json = serde_json::to_value(training_categories()).unwrap();
        let grundstufe = &json[0];
        assert_eq!(grundstufe["key"], "grundstufe");
        assert!(grundstufe["sections"][0]["items"].is_array());
        let situative = &json[1];
        assert!(situative["sections"][0]["sections"].is_array());
        assert!(situative["sections"][0].get("items").is_none());
    }
}
