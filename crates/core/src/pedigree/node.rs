use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Coefficient, Generation};

use super::ear_tag::EarTag;

/// Sex of a rabbit as reported by the registry.
///
/// Parsing is lenient: English and Danish spellings are recognised and any
/// other value is kept verbatim in [`Sex::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sex {
    Buck,
    Doe,
    Other(String),
}

impl From<String> for Sex {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "buck" | "male" | "han" | "m" => Sex::Buck,
            "doe" | "female" | "hun" | "f" => Sex::Doe,
            _ => Sex::Other(s),
        }
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Buck => "buck".to_string(),
            Sex::Doe => "doe".to_string(),
            Sex::Other(s) => s,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Buck => f.write_str("buck"),
            Sex::Doe => f.write_str("doe"),
            Sex::Other(s) => f.write_str(s),
        }
    }
}

/// One individual in a pedigree, owning the subtrees of its parents.
///
/// Edges point from descendant to ancestor, so the tree has no cycles and
/// no back-references. The same physical rabbit may appear at several
/// positions; each position is its own node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestorNode {
    /// Ear tag, `RRRR-LLLL`. Not validated during traversal.
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Also read from `race`. A payload carrying both spellings is
    /// rejected as a duplicate field.
    #[serde(default, alias = "race")]
    pub breed: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Also read from `originFullName`; both spellings at once is an error.
    #[serde(default, alias = "originFullName")]
    pub origin_owner: Option<String>,
    /// Also read from `ownerFullName`; both spellings at once is an error.
    #[serde(default, alias = "ownerFullName")]
    pub current_owner: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Computed by the registry backend and only carried here.
    #[serde(default)]
    pub inbreeding_coefficient: Option<Coefficient>,
    /// Relationship to the pedigree subject, e.g. `"Paternal grandmother"`.
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub father: Option<Box<AncestorNode>>,
    #[serde(default)]
    pub mother: Option<Box<AncestorNode>>,
}

impl AncestorNode {
    /// Create a node with the given id and no known attributes or parents.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Parse a pedigree tree from the JSON payload returned by the registry.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this tree back to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_father(mut self, father: AncestorNode) -> Self {
        self.father = Some(Box::new(father));
        self
    }

    pub fn with_mother(mut self, mother: AncestorNode) -> Self {
        self.mother = Some(Box::new(mother));
        self
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_inbreeding(mut self, coefficient: Coefficient) -> Self {
        self.inbreeding_coefficient = Some(coefficient);
        self
    }

    /// Father and mother, in that order.
    pub fn parents(&self) -> (Option<&AncestorNode>, Option<&AncestorNode>) {
        (self.father.as_deref(), self.mother.as_deref())
    }

    /// Whether neither parent is known.
    pub fn is_leaf(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    /// Parse the node id as an [`EarTag`].
    pub fn ear_tag(&self) -> Result<EarTag> {
        EarTag::parse(&self.id)
    }

    /// Pre-order iterator: self, then the father subtree, then the mother
    /// subtree.
    pub fn iter(&self) -> Ancestors<'_> {
        Ancestors { stack: vec![self] }
    }

    /// Fill `generation` and `relation` for every node, treating `self` as
    /// the pedigree subject.
    pub fn with_relations(mut self) -> Self {
        label_subtree(&mut self, 0, None, true);
        self
    }

    /// A flat, parent-free view of this node for display.
    pub fn summary(&self) -> AncestorSummary<'_> {
        AncestorSummary {
            id: &self.id,
            nickname: self.nickname.as_deref(),
            sex: self.sex.as_ref(),
            birth_date: self.birth_date.as_deref(),
            breed: self.breed.as_deref(),
            color: self.color.as_deref(),
            current_owner: self.current_owner.as_deref(),
            profile_picture: self.profile_picture.as_deref(),
            inbreeding_coefficient: self.inbreeding_coefficient,
            relation: &self.relation,
            generation: self.generation,
        }
    }
}

/// Borrowed display fields of an [`AncestorNode`], without its parents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AncestorSummary<'a> {
    pub id: &'a str,
    pub nickname: Option<&'a str>,
    pub sex: Option<&'a Sex>,
    pub birth_date: Option<&'a str>,
    pub breed: Option<&'a str>,
    pub color: Option<&'a str>,
    pub current_owner: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
    pub inbreeding_coefficient: Option<Coefficient>,
    pub relation: &'a str,
    pub generation: Generation,
}

/// Explicit-stack pre-order iterator over a pedigree tree.
pub struct Ancestors<'a> {
    stack: Vec<&'a AncestorNode>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a AncestorNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Mother first so the father subtree is visited first.
        if let Some(mother) = node.mother.as_deref() {
            self.stack.push(mother);
        }
        if let Some(father) = node.father.as_deref() {
            self.stack.push(father);
        }
        Some(node)
    }
}

impl<'a> IntoIterator for &'a AncestorNode {
    type Item = &'a AncestorNode;
    type IntoIter = Ancestors<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Which parent of the subject a line of ancestors descends through.
#[derive(Debug, Clone, Copy)]
enum Side {
    Paternal,
    Maternal,
}

fn label_subtree(node: &mut AncestorNode, generation: Generation, side: Option<Side>, male: bool) {
    node.generation = generation;
    node.relation = relation_label(generation, side, male);

    let father_side = side.or(Some(Side::Paternal));
    let mother_side = side.or(Some(Side::Maternal));
    if let Some(father) = node.father.as_deref_mut() {
        label_subtree(father, generation + 1, father_side, true);
    }
    if let Some(mother) = node.mother.as_deref_mut() {
        label_subtree(mother, generation + 1, mother_side, false);
    }
}

fn relation_label(generation: Generation, side: Option<Side>, male: bool) -> String {
    let parent = if male { "father" } else { "mother" };
    match (generation, side) {
        (0, _) | (_, None) => "Self".to_string(),
        (1, _) => (if male { "Father" } else { "Mother" }).to_string(),
        (g, Some(side)) => {
            let side = match side {
                Side::Paternal => "Paternal",
                Side::Maternal => "Maternal",
            };
            format!("{} {}grand{}", side, "great-".repeat(g - 2), parent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_generations() -> AncestorNode {
        AncestorNode::new("0001-0001")
            .with_father(
                AncestorNode::new("0002-0002")
                    .with_father(AncestorNode::new("0004-0004"))
                    .with_mother(AncestorNode::new("0005-0005")),
            )
            .with_mother(
                AncestorNode::new("0003-0003")
                    .with_mother(AncestorNode::new("0007-0007").with_father(AncestorNode::new("0008-0008"))),
            )
    }

    #[test]
    fn test_from_json_backend_payload() {
        let json = r#"{
            "id": "4977-2041",
            "nickname": "Blåbær",
            "sex": "Hun",
            "birthDate": "2023-04-01",
            "race": "Angora",
            "color": "Blå",
            "ownerFullName": "Maja Jensen",
            "inbreedingCoefficient": 0.0625,
            "relation": "Self",
            "generation": 0,
            "father": { "id": "1000-2000", "sex": "buck", "mother": null },
            "mother": null
        }"#;
        let node = AncestorNode::from_json(json).unwrap();
        assert_eq!(node.id, "4977-2041");
        assert_eq!(node.nickname.as_deref(), Some("Blåbær"));
        assert_eq!(node.sex, Some(Sex::Doe));
        assert_eq!(node.breed.as_deref(), Some("Angora"));
        assert_eq!(node.current_owner.as_deref(), Some("Maja Jensen"));
        assert_relative_eq!(node.inbreeding_coefficient.unwrap(), 0.0625);

        let father = node.father.as_deref().unwrap();
        assert_eq!(father.sex, Some(Sex::Buck));
        assert_eq!(father.relation, "");
        assert_eq!(father.generation, 0);
        assert!(father.is_leaf());
        assert!(node.mother.is_none());
    }

    #[test]
    fn test_json_round_trip_preserves_tree() {
        let tree = three_generations().with_relations();
        let json = tree.to_json().unwrap();
        let back = AncestorNode::from_json(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_both_field_spellings_rejected() {
        let err = AncestorNode::from_json(r#"{"id":"0001-0001","breed":"Angora","race":"Rex"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field"), "Error was: {}", err);

        let err = AncestorNode::from_json(
            r#"{"id":"0001-0001","currentOwner":"Maja","ownerFullName":"Maja Jensen"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate field"), "Error was: {}", err);

        let node = AncestorNode::from_json(r#"{"id":"0001-0001","originFullName":"Ole"}"#).unwrap();
        assert_eq!(node.origin_owner.as_deref(), Some("Ole"));
    }

    #[test]
    fn test_unknown_sex_kept_verbatim() {
        let node = AncestorNode::from_json(r#"{"id":"0001-0001","sex":"ukendt"}"#).unwrap();
        assert_eq!(node.sex, Some(Sex::Other("ukendt".to_string())));
    }

    #[test]
    fn test_iter_is_pre_order_father_first() {
        let tree = three_generations();
        let ids: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["0001-0001", "0002-0002", "0004-0004", "0005-0005", "0003-0003", "0007-0007", "0008-0008"]
        );
    }

    #[test]
    fn test_with_relations_labels() {
        let tree = three_generations().with_relations();
        let labels: Vec<(&str, Generation)> =
            tree.iter().map(|n| (n.relation.as_str(), n.generation)).collect();
        assert_eq!(
            labels,
            vec![
                ("Self", 0),
                ("Father", 1),
                ("Paternal grandfather", 2),
                ("Paternal grandmother", 2),
                ("Mother", 1),
                ("Maternal grandmother", 2),
                ("Maternal great-grandfather", 3),
            ]
        );
    }

    #[test]
    fn test_ear_tag_from_node() {
        assert_eq!(AncestorNode::new("4977-2041").ear_tag().unwrap().left(), "2041");
        assert!(AncestorNode::new("bad").ear_tag().is_err());
    }

    #[test]
    fn test_summary_omits_parents() {
        let tree = three_generations().with_relations();
        let json = serde_json::to_value(tree.summary()).unwrap();
        assert_eq!(json["id"], "0001-0001");
        assert_eq!(json["relation"], "Self");
        assert!(json.get("father").is_none());
    }
}
