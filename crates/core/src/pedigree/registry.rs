use std::collections::HashMap;
use std::path::Path;

use crate::error::{PedigreeError, Result};
use crate::types::Generation;

use super::node::{AncestorNode, Sex};

/// A single registry record: a rabbit profile with optional sire and dam ids.
#[derive(Debug, Clone)]
struct RabbitRecord {
    /// Descriptive attributes; parents are always `None` here.
    profile: AncestorNode,
    /// Sire id as registered, or `None` if unknown.
    sire: Option<String>,
    /// Dam id as registered, or `None` if unknown.
    dam: Option<String>,
}

/// A flat table of rabbits with parent references, from which pedigree
/// trees are materialized.
///
/// Parent ids are resolved when a tree is built, so rabbits may be added in
/// any order. Use [`Registry::validate`] to check that every parent exists
/// and that no rabbit is its own ancestor.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Records in insertion order.
    records: Vec<RabbitRecord>,
    /// Mapping from rabbit id to its 0-based index.
    id_to_index: HashMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rabbits in the registry.
    pub fn n_rabbits(&self) -> usize {
        self.records.len()
    }

    /// Rabbit ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(|r| r.profile.id.as_str())
    }

    /// Profile of the rabbit with the given id, without parents.
    pub fn rabbit(&self, id: &str) -> Option<&AncestorNode> {
        self.index_of(id).map(|i| &self.records[i].profile)
    }

    /// Registered sire id of `id`.
    pub fn sire_of(&self, id: &str) -> Option<&str> {
        self.index_of(id).and_then(|i| self.records[i].sire.as_deref())
    }

    /// Registered dam id of `id`.
    pub fn dam_of(&self, id: &str) -> Option<&str> {
        self.index_of(id).and_then(|i| self.records[i].dam.as_deref())
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// Add a rabbit with no descriptive attributes.
    ///
    /// # Errors
    /// Returns an error if the id already exists.
    pub fn add_rabbit(&mut self, id: &str, sire: Option<&str>, dam: Option<&str>) -> Result<()> {
        self.add_profile(AncestorNode::new(id), sire, dam)
    }

    /// Add a rabbit profile. Any parents set on `profile` are discarded;
    /// lineage comes from `sire` and `dam` only.
    ///
    /// # Errors
    /// Returns an error if the id already exists.
    pub fn add_profile(
        &mut self,
        mut profile: AncestorNode,
        sire: Option<&str>,
        dam: Option<&str>,
    ) -> Result<()> {
        if self.id_to_index.contains_key(&profile.id) {
            return Err(PedigreeError::DuplicateAnimal(profile.id));
        }
        profile.father = None;
        profile.mother = None;

        self.id_to_index.insert(profile.id.clone(), self.records.len());
        self.records.push(RabbitRecord {
            profile,
            sire: sire.and_then(parse_parent),
            dam: dam.and_then(parse_parent),
        });
        Ok(())
    }

    /// Build a registry from (rabbit, sire, dam) triples.
    ///
    /// Parent values of `None` indicate unknown parents.
    ///
    /// # Errors
    /// Returns an error if duplicate rabbit ids are found.
    pub fn from_triples(triples: &[(String, Option<String>, Option<String>)]) -> Result<Self> {
        let mut registry = Self::new();
        for (id, sire, dam) in triples {
            registry.add_rabbit(id, sire.as_deref(), dam.as_deref())?;
        }
        Ok(registry)
    }

    /// Read a registry from a CSV file.
    ///
    /// Required columns (header required): `animal`, `sire`, `dam`.
    /// Optional columns: `nickname`, `sex`, `birth_date`, `breed`, `color`,
    /// `origin_owner`, `owner`, `picture`, `inbreeding`.
    /// Unknown parents are coded as `"0"`, `""`, or `"NA"`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, an inbreeding value is not a number, or duplicate ids are
    /// found.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            column(name).ok_or_else(|| {
                PedigreeError::Pedigree(format!("CSV missing '{}' column", name))
            })
        };

        let animal_col = required("animal")?;
        let sire_col = required("sire")?;
        let dam_col = required("dam")?;
        let nickname_col = column("nickname");
        let sex_col = column("sex");
        let birth_col = column("birth_date");
        let breed_col = column("breed");
        let color_col = column("color");
        let origin_col = column("origin_owner");
        let owner_col = column("owner");
        let picture_col = column("picture");
        let inbreeding_col = column("inbreeding");

        let mut registry = Self::new();

        for result in reader.records() {
            let record = result?;
            let field = |col: Option<usize>| {
                col.and_then(|c| record.get(c))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };

            let animal = field(Some(animal_col)).ok_or_else(|| {
                PedigreeError::Pedigree("Missing animal field in row".to_string())
            })?;

            let inbreeding = match field(inbreeding_col) {
                Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                    PedigreeError::Data(format!(
                        "Inbreeding value '{}' for '{}' is not a number",
                        raw, animal
                    ))
                })?),
                None => None,
            };

            let profile = AncestorNode {
                id: animal,
                nickname: field(nickname_col),
                sex: field(sex_col).map(Sex::from),
                birth_date: field(birth_col),
                breed: field(breed_col),
                color: field(color_col),
                origin_owner: field(origin_col),
                current_owner: field(owner_col),
                profile_picture: field(picture_col),
                inbreeding_coefficient: inbreeding,
                ..AncestorNode::default()
            };

            let sire = field(Some(sire_col));
            let dam = field(Some(dam_col));
            registry.add_profile(profile, sire.as_deref(), dam.as_deref())?;
        }

        log::debug!(
            "Loaded {} rabbits from '{}'",
            registry.n_rabbits(),
            path.display()
        );
        Ok(registry)
    }

    /// Validate the registry for consistency.
    ///
    /// Checks:
    /// - All referenced parent ids exist in the registry.
    /// - No rabbit is its own sire or dam.
    /// - No rabbit is its own ancestor (cycle detection).
    ///
    /// # Errors
    /// Returns an error describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let n = self.records.len();
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n];

        for (i, rec) in self.records.iter().enumerate() {
            for (role, parent) in [("sire", &rec.sire), ("dam", &rec.dam)] {
                let Some(parent) = parent else { continue };
                let p = self.index_of(parent).ok_or_else(|| {
                    PedigreeError::Pedigree(format!(
                        "Rabbit '{}' references {} '{}' which is not in the registry",
                        rec.profile.id, role, parent
                    ))
                })?;
                if p == i {
                    return Err(PedigreeError::Pedigree(format!(
                        "Rabbit '{}' is listed as its own {}",
                        rec.profile.id, role
                    )));
                }
                parents[i].push(p);
            }
        }

        // Kahn's algorithm over parent -> offspring edges. If some nodes
        // are never released, there is a cycle.
        let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0u32; n];
        for (child, ps) in parents.iter().enumerate() {
            for &p in ps {
                children_of[p].push(child);
                in_degree[child] += 1;
            }
        }

        let mut queue: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut visited = 0usize;

        while let Some(node) = queue.pop() {
            visited += 1;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push(child);
                }
            }
        }

        if visited != n {
            let stuck = (0..n).find(|&i| in_degree[i] > 0).unwrap_or(0);
            return Err(PedigreeError::Cycle(self.records[stuck].profile.id.clone()));
        }

        Ok(())
    }

    /// Materialize the pedigree of `id` with at most `generations` parent
    /// edges above it, labelled with generations and relations.
    ///
    /// Every position gets its own copy of the ancestor's profile. Parents
    /// that are not in the registry are left unknown.
    ///
    /// # Errors
    /// Returns [`PedigreeError::AnimalNotFound`] if `id` is not registered,
    /// and [`PedigreeError::Cycle`] if a rabbit within reach is its own
    /// ancestor.
    pub fn ancestor_tree(&self, id: &str, generations: Generation) -> Result<AncestorNode> {
        let index = self
            .index_of(id)
            .ok_or_else(|| PedigreeError::AnimalNotFound(id.to_string()))?;
        let mut line = Vec::new();
        Ok(self.materialize(index, generations, &mut line)?.with_relations())
    }

    /// `line` holds the indices from the subject down to `index`'s child.
    /// Its length never exceeds the number of rabbits, so recursion depth
    /// is bounded even when `generations` is huge.
    fn materialize(
        &self,
        index: usize,
        remaining: Generation,
        line: &mut Vec<usize>,
    ) -> Result<AncestorNode> {
        let record = &self.records[index];
        if line.contains(&index) {
            return Err(PedigreeError::Cycle(record.profile.id.clone()));
        }

        let mut node = record.profile.clone();
        if remaining == 0 {
            return Ok(node);
        }

        // On error the whole materialization is abandoned, so `line` need
        // not be restored.
        line.push(index);
        node.father = self
            .resolve(record, record.sire.as_deref())
            .map(|p| self.materialize(p, remaining - 1, line))
            .transpose()?
            .map(Box::new);
        node.mother = self
            .resolve(record, record.dam.as_deref())
            .map(|p| self.materialize(p, remaining - 1, line))
            .transpose()?
            .map(Box::new);
        line.pop();
        Ok(node)
    }

    fn resolve(&self, child: &RabbitRecord, parent: Option<&str>) -> Option<usize> {
        let parent = parent?;
        let index = self.index_of(parent);
        if index.is_none() {
            log::warn!(
                "Parent '{}' of '{}' is not in the registry; treating as unknown",
                parent,
                child.profile.id
            );
        }
        index
    }
}

/// Parse a parent string, returning `None` for unknown parents.
///
/// Unknown parents are coded as `"0"`, `""`, `"NA"`, or `"na"`.
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
