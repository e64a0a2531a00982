mod reader;

pub use reader::{load_pedigree, open_pedigree_reader, read_records};

use crate::inference::ModelError;
use std::collections::HashMap;

/// One raw row of a pedigree file, before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PedigreeRecord {
    pub name: String,
    pub mother: Option<String>,
    pub father: Option<String>,
    pub phenotype: Option<bool>,
}

/// A validated individual. Parent links are ordinal indices into the owning
/// `Pedigree`, either both present or both absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub parents: Option<(usize, usize)>,
    pub phenotype: Option<bool>,
}

impl Member {
    pub fn is_founder(&self) -> bool {
        self.parents.is_none()
    }
}

/// An immutable family tree. Construction validates the structural rules so
/// inference can trust every parent link: unique names, two-or-zero parents,
/// parents that resolve to known members, and an acyclic parent graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Pedigree {
    members: Vec<Member>,
}

impl Pedigree {
    pub fn from_records(records: &[PedigreeRecord]) -> Result<Self, ModelError> {
        let mut ordinals = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if record.name.is_empty() {
                return Err(ModelError::InvalidPedigree(format!(
                    "record {} has an empty name",
                    index + 1
                )));
            }
            if ordinals.insert(record.name.clone(), index).is_some() {
                return Err(ModelError::InvalidPedigree(format!(
                    "duplicate individual '{}'",
                    record.name
                )));
            }
        }

        let mut members = Vec::with_capacity(records.len());
        for record in records {
            let parents = match (&record.mother, &record.father) {
                (None, None) => None,
                (Some(mother), Some(father)) => {
                    let mother = resolve_parent(&ordinals, &record.name, mother)?;
                    let father = resolve_parent(&ordinals, &record.name, father)?;
                    Some((mother, father))
                }
                _ => {
                    return Err(ModelError::InvalidPedigree(format!(
                        "'{}' has exactly one parent, expected both or neither",
                        record.name
                    )))
                }
            };
            members.push(Member {
                name: record.name.clone(),
                parents,
                phenotype: record.phenotype,
            });
        }

        let pedigree = Pedigree { members };
        pedigree.check_acyclic()?;
        Ok(pedigree)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn founder_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_founder()).count()
    }

    pub fn evidence_count(&self) -> usize {
        self.members.iter().filter(|m| m.phenotype.is_some()).count()
    }

    // Three-color DFS over parent links, iterative to keep deep pedigrees
    // off the call stack.
    fn check_acyclic(&self) -> Result<(), ModelError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        let mut marks = vec![Mark::White; self.members.len()];
        for start in 0..self.members.len() {
            if marks[start] != Mark::White {
                continue;
            }
            let mut stack = vec![(start, false)];
            while let Some((node, expanded)) = stack.pop() {
                if expanded {
                    marks[node] = Mark::Black;
                    continue;
                }
                if marks[node] == Mark::Black {
                    continue;
                }
                marks[node] = Mark::Gray;
                stack.push((node, true));
                if let Some((mother, father)) = self.members[node].parents {
                    for parent in [mother, father] {
                        match marks[parent] {
                            Mark::Gray => {
                                return Err(ModelError::InvalidPedigree(format!(
                                    "parent graph contains a cycle through '{}'",
                                    self.members[parent].name
                                )))
                            }
                            Mark::White => stack.push((parent, false)),
                            Mark::Black => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn resolve_parent(
    ordinals: &HashMap<String, usize>,
    child: &str,
    parent: &str,
) -> Result<usize, ModelError> {
    ordinals.get(parent).copied().ok_or_else(|| {
        ModelError::InvalidPedigree(format!(
            "'{}' references unknown parent '{}'",
            child, parent
        ))
    })
}

#[cfg(test)]
pub(crate) fn record(name: &str, mother: &str, father: &str, phenotype: Option<bool>) -> PedigreeRecord {
    let opt = |s: &str| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };
    PedigreeRecord {
        name: name.to_string(),
        mother: opt(mother),
        father: opt(father),
        phenotype,
    }
}
