use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::BiocycError;

/// Organism database scope (e.g. `HUMAN`, `ECOLI`, `META`). Always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Organism(String);

impl Organism {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Organism {
    fn default() -> Self {
        Self("HUMAN".to_string())
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Organism {
    type Err = BiocycError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let is_valid = !normalized.is_empty()
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(BiocycError::InvalidOrganism(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    None,
    Low,
    #[default]
    Full,
}

impl DetailLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailLevel::None => "none",
            DetailLevel::Low => "low",
            DetailLevel::Full => "full",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = BiocycError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(DetailLevel::None),
            "low" => Ok(DetailLevel::Low),
            "full" => Ok(DetailLevel::Full),
            _ => Err(BiocycError::InvalidDetailLevel(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Compound,
    Pathway,
    Reaction,
    EnzymaticReaction,
    Protein,
    Gene,
    Organism,
    DnaBindingSite,
    Polypeptides,
    Promoter,
    Complex,
    ProteinFeature,
    TranscriptionUnit,
    Trna,
    Regulation,
    Chromosome,
}

impl Category {
    /// Schema dispatch priority. The first category whose marker appears at the
    /// document root wins.
    pub const DISPATCH_ORDER: [Category; 15] = [
        Category::Compound,
        Category::Pathway,
        Category::Reaction,
        Category::Protein,
        Category::Gene,
        Category::DnaBindingSite,
        Category::EnzymaticReaction,
        Category::Organism,
        Category::Polypeptides,
        Category::Promoter,
        Category::Complex,
        Category::ProteinFeature,
        Category::TranscriptionUnit,
        Category::Trna,
        Category::Regulation,
    ];

    pub const ALL: [Category; 16] = [
        Category::Compound,
        Category::Pathway,
        Category::Reaction,
        Category::EnzymaticReaction,
        Category::Protein,
        Category::Gene,
        Category::Organism,
        Category::DnaBindingSite,
        Category::Polypeptides,
        Category::Promoter,
        Category::Complex,
        Category::ProteinFeature,
        Category::TranscriptionUnit,
        Category::Trna,
        Category::Regulation,
        Category::Chromosome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Compound => "compound",
            Category::Pathway => "pathway",
            Category::Reaction => "reaction",
            Category::EnzymaticReaction => "enzymatic-reaction",
            Category::Protein => "protein",
            Category::Gene => "gene",
            Category::Organism => "organism",
            Category::DnaBindingSite => "dna-binding-site",
            Category::Polypeptides => "polypeptides",
            Category::Promoter => "promoter",
            Category::Complex => "complex",
            Category::ProteinFeature => "protein-feature",
            Category::TranscriptionUnit => "transcription-unit",
            Category::Trna => "trna",
            Category::Regulation => "regulation",
            Category::Chromosome => "chromosome",
        }
    }

    /// Element name that identifies this category directly under the document root.
    /// Chromosomes are never dispatched to.
    pub fn schema_marker(&self) -> Option<&'static str> {
        match self {
            Category::Compound => Some("Compound"),
            Category::Pathway => Some("Pathway"),
            Category::Reaction => Some("Reaction"),
            Category::EnzymaticReaction => Some("Enzymatic-Reaction"),
            Category::Protein => Some("Protein"),
            Category::Gene => Some("Gene"),
            Category::Organism => Some("Organism"),
            Category::DnaBindingSite => Some("DNA-Binding-Site"),
            Category::Polypeptides => Some("Polypeptide"),
            Category::Promoter => Some("Promoter"),
            Category::Complex => Some("Complex"),
            Category::ProteinFeature => Some("Protein-Feature"),
            Category::TranscriptionUnit => Some("Transcription-Unit"),
            Category::Trna => Some("tRNA"),
            Category::Regulation => Some("Regulation"),
            Category::Chromosome => None,
        }
    }

    /// Catalog and name-index bucket. Categories without one are cached but
    /// neither listed nor searchable by name.
    pub fn bucket(&self) -> Option<Bucket> {
        match self {
            Category::Compound => Some(Bucket::Compounds),
            Category::Pathway => Some(Bucket::Pathways),
            Category::Reaction => Some(Bucket::Reactions),
            Category::Protein => Some(Bucket::Proteins),
            Category::Gene => Some(Bucket::Genes),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = BiocycError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| BiocycError::InvalidCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Pathways,
    Genes,
    Reactions,
    Compounds,
    Proteins,
}

impl Bucket {
    /// Probe order for name lookups that do not name a bucket.
    pub const NAME_SEARCH_ORDER: [Bucket; 5] = [
        Bucket::Pathways,
        Bucket::Genes,
        Bucket::Reactions,
        Bucket::Compounds,
        Bucket::Proteins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Pathways => "pathways",
            Bucket::Genes => "genes",
            Bucket::Reactions => "reactions",
            Bucket::Compounds => "compounds",
            Bucket::Proteins => "proteins",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Bucket::Pathways => Category::Pathway,
            Bucket::Genes => Category::Gene,
            Bucket::Reactions => Category::Reaction,
            Bucket::Compounds => Category::Compound,
            Bucket::Proteins => Category::Protein,
        }
    }

    pub fn synonyms_file_name(&self) -> String {
        format!("{}-synonyms", self.as_str())
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Relation {
    Parents,
    Instances,
    Reactions,
    Pathways,
    SuperPathways,
    Species,
    TaxonomicRange,
    CompoundsLeft,
    CompoundsRight,
    Compounds,
    EnzymaticReactions,
    Enzymes,
    Genes,
    Components,
    Products,
}

impl FromStr for Relation {
    type Err = BiocycError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <Relation as ValueEnum>::from_str(value.trim(), true)
            .map_err(|_| BiocycError::InvalidRelation(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn organism_is_upper_cased() {
        let org: Organism = " ecoli ".parse().unwrap();
        assert_eq!(org.as_str(), "ECOLI");
    }

    #[test]
    fn organism_rejects_path_characters() {
        let err = "../etc".parse::<Organism>().unwrap_err();
        assert_matches!(err, BiocycError::InvalidOrganism(_));
        assert_matches!("".parse::<Organism>(), Err(BiocycError::InvalidOrganism(_)));
    }

    #[test]
    fn detail_level_parse() {
        assert_eq!("low".parse::<DetailLevel>().unwrap(), DetailLevel::Low);
        let err = "verbose".parse::<DetailLevel>().unwrap_err();
        assert_matches!(err, BiocycError::InvalidDetailLevel(_));
    }

    #[test]
    fn only_chromosome_lacks_marker() {
        for category in Category::ALL {
            let in_dispatch = Category::DISPATCH_ORDER.contains(&category);
            assert_eq!(category.schema_marker().is_some(), in_dispatch, "{category}");
        }
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn relation_parse_is_kebab_case() {
        assert_eq!(
            "compounds-left".parse::<Relation>().unwrap(),
            Relation::CompoundsLeft
        );
        assert_matches!(
            "siblings".parse::<Relation>(),
            Err(BiocycError::InvalidRelation(_))
        );
    }
}
