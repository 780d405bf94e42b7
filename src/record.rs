use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Organism, Relation};
use crate::text::strip_markup;

/// A typed BioCyc frame. Neighbours are held as identifier lists only and are
/// resolved on demand through the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    /// Cache scope the record was requested under.
    pub organism: Organism,
    pub category: Category,
    /// `orgid` attribute of the source document, when present.
    #[serde(default)]
    pub source_organism: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_html: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub dblinks: BTreeMap<String, String>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub instances: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub details: Details,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Details {
    Compound(CompoundDetails),
    Pathway(PathwayDetails),
    Reaction(ReactionDetails),
    EnzymaticReaction(EnzymaticReactionDetails),
    Protein(ProteinDetails),
    Gene(GeneDetails),
    None,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompoundDetails {
    pub inchi: Option<String>,
    pub molecular_weight: Option<f64>,
    pub gibbs0: Option<f64>,
    pub reactions_right: Vec<String>,
    pub reactions_left: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathwayDetails {
    pub reactions: Vec<String>,
    pub species: Vec<String>,
    pub super_pathways: Vec<String>,
    pub taxonomic_range: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReactionDetails {
    pub pathways: Vec<String>,
    pub compounds_left: Vec<String>,
    pub compounds_right: Vec<String>,
    pub enzymatic_reactions: Vec<String>,
    pub direction: Option<String>,
    pub ec_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnzymaticReactionDetails {
    pub reactions: Vec<String>,
    pub enzymes: Vec<String>,
    pub pathways: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProteinDetails {
    pub genes: Vec<String>,
    pub components: Vec<String>,
    pub catalyzes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneDetails {
    pub products: Vec<String>,
    pub left_end_position: Option<u64>,
    pub right_end_position: Option<u64>,
    pub transcription_direction: Option<String>,
}

impl Record {
    pub fn new(id: &str, organism: &Organism, category: Category) -> Self {
        let details = match category {
            Category::Compound => Details::Compound(CompoundDetails::default()),
            Category::Pathway => Details::Pathway(PathwayDetails::default()),
            Category::Reaction => Details::Reaction(ReactionDetails::default()),
            Category::EnzymaticReaction => {
                Details::EnzymaticReaction(EnzymaticReactionDetails::default())
            }
            Category::Protein => Details::Protein(ProteinDetails::default()),
            Category::Gene => Details::Gene(GeneDetails::default()),
            _ => Details::None,
        };
        Self {
            id: id.to_string(),
            organism: organism.clone(),
            category,
            source_organism: None,
            name: None,
            name_html: None,
            synonyms: Vec::new(),
            dblinks: BTreeMap::new(),
            parents: Vec::new(),
            instances: Vec::new(),
            created_at: Utc::now(),
            details,
        }
    }

    /// Plaintext label, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Identifiers behind `relation`; empty when it does not apply to this category.
    pub fn related_ids(&self, relation: Relation) -> Vec<&str> {
        let lists: Vec<&Vec<String>> = match (relation, &self.details) {
            (Relation::Parents, _) => vec![&self.parents],
            (Relation::Instances, _) => vec![&self.instances],
            (Relation::Reactions, Details::Compound(c)) => {
                vec![&c.reactions_right, &c.reactions_left]
            }
            (Relation::Reactions, Details::Pathway(p)) => vec![&p.reactions],
            (Relation::Reactions, Details::EnzymaticReaction(e)) => vec![&e.reactions],
            (Relation::Pathways, Details::Reaction(r)) => vec![&r.pathways],
            (Relation::Pathways, Details::EnzymaticReaction(e)) => vec![&e.pathways],
            (Relation::SuperPathways, Details::Pathway(p)) => vec![&p.super_pathways],
            (Relation::Species, Details::Pathway(p)) => vec![&p.species],
            (Relation::TaxonomicRange, Details::Pathway(p)) => vec![&p.taxonomic_range],
            (Relation::CompoundsLeft, Details::Reaction(r)) => vec![&r.compounds_left],
            (Relation::CompoundsRight, Details::Reaction(r)) => vec![&r.compounds_right],
            (Relation::Compounds, Details::Reaction(r)) => {
                vec![&r.compounds_left, &r.compounds_right]
            }
            (Relation::EnzymaticReactions, Details::Reaction(r)) => vec![&r.enzymatic_reactions],
            (Relation::EnzymaticReactions, Details::Protein(p)) => vec![&p.catalyzes],
            (Relation::Enzymes, Details::EnzymaticReaction(e)) => vec![&e.enzymes],
            (Relation::Genes, Details::Protein(p)) => vec![&p.genes],
            (Relation::Components, Details::Protein(p)) => vec![&p.components],
            (Relation::Products, Details::Gene(g)) => vec![&g.products],
            _ => Vec::new(),
        };
        lists
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
            .collect()
    }

    /// Every name this record can be found under by the name index. Marked-up
    /// synonyms are listed both as written and in plaintext.
    pub fn index_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name.iter().cloned().collect();
        for synonym in &self.synonyms {
            let plain = strip_markup(synonym);
            if plain != *synonym {
                names.push(synonym.clone());
                names.push(plain);
            } else {
                names.push(plain);
            }
        }
        names
    }
}

/// Cached confirmation that an identifier has no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotFound {
    pub id: String,
    pub organism: Organism,
    pub created_at: DateTime<Utc>,
}

impl NotFound {
    pub fn new(id: &str, organism: &Organism) -> Self {
        Self {
            id: id.to_string(),
            organism: organism.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Content of one cache slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Entry {
    Found(Box<Record>),
    NotFound(NotFound),
}

impl Entry {
    pub fn found(record: Record) -> Self {
        Entry::Found(Box::new(record))
    }

    pub fn id(&self) -> &str {
        match self {
            Entry::Found(record) => &record.id,
            Entry::NotFound(missing) => &missing.id,
        }
    }

    pub fn organism(&self) -> &Organism {
        match self {
            Entry::Found(record) => &record.organism,
            Entry::NotFound(missing) => &missing.organism,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Entry::Found(record) => record.created_at,
            Entry::NotFound(missing) => missing.created_at,
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.record().map(|record| record.category)
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Entry::Found(_))
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Entry::Found(record) => Some(&**record),
            Entry::NotFound(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Entry::Found(record) => Some(*record),
            Entry::NotFound(_) => None,
        }
    }
}
