//! Schema dispatch: maps a fetched `ptools-xml` document onto a typed record.
//!
//! Every import rule is lenient. A missing or malformed field leaves the
//! attribute at its default.

use crate::document::Element;
use crate::domain::{Category, Organism};
use crate::record::{
    CompoundDetails, Details, EnzymaticReactionDetails, Entry, GeneDetails, NotFound,
    PathwayDetails, ProteinDetails, ReactionDetails, Record,
};
use crate::text::strip_markup;

/// Result of building one document. `embedded` holds inline enzymatic
/// reactions found while building a reaction; they must be cached too.
#[derive(Debug, Clone)]
pub struct Built {
    pub entry: Entry,
    pub embedded: Vec<Record>,
}

impl Built {
    pub fn not_found(organism: &Organism, id: &str) -> Self {
        Self {
            entry: Entry::NotFound(NotFound::new(id, organism)),
            embedded: Vec::new(),
        }
    }
}

/// First category, in dispatch order, whose marker is a child of the document root.
pub fn classify(document: &Element) -> Option<(Category, &Element)> {
    Category::DISPATCH_ORDER.into_iter().find_map(|category| {
        let marker = category.schema_marker()?;
        document.find(marker).map(|element| (category, element))
    })
}

pub fn build(organism: &Organism, id: &str, document: &Element) -> Built {
    let Some((category, element)) = classify(document) else {
        tracing::debug!(%organism, id, "no schema marker matched");
        return Built::not_found(organism, id);
    };
    let mut embedded = Vec::new();
    let record = build_record(organism, id, category, element, &mut embedded);
    tracing::debug!(%organism, id, %category, name = record.display_name(), "record built");
    Built {
        entry: Entry::found(record),
        embedded,
    }
}

fn build_record(
    organism: &Organism,
    id: &str,
    category: Category,
    element: &Element,
    embedded: &mut Vec<Record>,
) -> Record {
    let mut record = Record::new(id, organism, category);
    import_common(&mut record, element);

    match &mut record.details {
        Details::Compound(details) => import_compound(details, element),
        Details::Pathway(details) => import_pathway(details, element),
        Details::Reaction(details) => {
            import_reaction(details, element);
            for inline in element.find_all("enzymatic-reaction/Enzymatic-Reaction") {
                let Some(inline_id) = inline.attr("frameid").filter(|id| !id.is_empty()) else {
                    continue;
                };
                if inline.has_children() {
                    let mut nested = Vec::new();
                    embedded.push(build_record(
                        organism,
                        inline_id,
                        Category::EnzymaticReaction,
                        inline,
                        &mut nested,
                    ));
                }
            }
        }
        Details::EnzymaticReaction(details) => import_enzymatic_reaction(details, element),
        Details::Protein(details) => import_protein(details, element),
        Details::Gene(details) => import_gene(details, element),
        Details::None => {}
    }
    record
}

fn import_common(record: &mut Record, element: &Element) {
    record.source_organism = element.attr("orgid").map(str::to_string);
    record.parents = element.frame_ids("parent/*");
    record.instances = element.frame_ids("instance/*");
    record.synonyms = element
        .find_all("synonym")
        .into_iter()
        .filter_map(Element::text)
        .map(str::to_string)
        .collect();
    record.name_html = element
        .find_text("common-name")
        .map(str::to_string)
        .or_else(|| record.synonyms.last().cloned());
    record.name = record.name_html.as_deref().map(strip_markup);

    for link in element.find_all("dblink") {
        if let (Some(db), Some(oid)) = (link.find_text("dblink-db"), link.find_text("dblink-oid")) {
            record.dblinks.insert(db.to_string(), oid.to_string());
        }
    }
}

fn import_compound(details: &mut CompoundDetails, element: &Element) {
    details.inchi = element.find_text("inchi").map(str::to_string);
    details.molecular_weight = float_field(element, "molecular-weight");
    details.gibbs0 = float_field(element, "gibbs-0");
    details.reactions_right = element.frame_ids("appears-in-right-side-of/*");
    details.reactions_left = element.frame_ids("appears-in-left-side-of/*");
}

fn import_pathway(details: &mut PathwayDetails, element: &Element) {
    details.reactions = element.frame_ids("reaction-list/*");
    details.species = element.frame_ids("species/*");
    details.super_pathways = element.frame_ids("super-pathways/*");
    details.taxonomic_range = element.frame_ids("taxonomic-range/*");
}

fn import_reaction(details: &mut ReactionDetails, element: &Element) {
    details.pathways = element.frame_ids("in-pathway/*");
    details.compounds_left = element.frame_ids("left/*");
    details.compounds_right = element.frame_ids("right/*");
    details.enzymatic_reactions = element.frame_ids("enzymatic-reaction/*");
    details.direction = element.find_text("reaction-direction").map(str::to_string);
    details.ec_number = element.find_text("ec-number").map(str::to_string);
}

fn import_enzymatic_reaction(details: &mut EnzymaticReactionDetails, element: &Element) {
    details.reactions = element.frame_ids("reaction/*");
    details.enzymes = element.frame_ids("enzyme/*");
    details.pathways = element.frame_ids("in-pathway/*");
}

fn import_protein(details: &mut ProteinDetails, element: &Element) {
    details.genes = element.frame_ids("gene/*");
    details.components = element.frame_ids("component/*");
    details.catalyzes = element.frame_ids("catalyzes/*");
}

fn import_gene(details: &mut GeneDetails, element: &Element) {
    details.products = element.frame_ids("product/*");
    details.left_end_position = element
        .find_text("left-end-position")
        .and_then(|value| value.parse().ok());
    details.right_end_position = element
        .find_text("right-end-position")
        .and_then(|value| value.parse().ok());
    details.transcription_direction = element
        .find_text("transcription-direction")
        .map(str::to_string);
}

fn float_field(element: &Element, path: &str) -> Option<f64> {
    element
        .find_text(path)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
