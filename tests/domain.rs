use assert_matches::assert_matches;

use biocyc_cache::domain::{Bucket, Category, DetailLevel};
use biocyc_cache::error::BiocycError;

#[test]
fn dispatch_order_is_canonical() {
    let markers: Vec<&str> = Category::DISPATCH_ORDER
        .iter()
        .filter_map(Category::schema_marker)
        .collect();
    assert_eq!(
        markers,
        vec![
            "Compound",
            "Pathway",
            "Reaction",
            "Protein",
            "Gene",
            "DNA-Binding-Site",
            "Enzymatic-Reaction",
            "Organism",
            "Polypeptide",
            "Promoter",
            "Complex",
            "Protein-Feature",
            "Transcription-Unit",
            "tRNA",
            "Regulation",
        ]
    );
}

#[test]
fn only_core_categories_have_buckets() {
    let bucketed: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|category| category.bucket().is_some())
        .collect();
    assert_eq!(bucketed.len(), 5);
    assert!(Category::EnzymaticReaction.bucket().is_none());
    for bucket in Bucket::NAME_SEARCH_ORDER {
        assert_eq!(bucket.category().bucket(), Some(bucket));
    }
}

#[test]
fn name_search_order() {
    assert_eq!(
        Bucket::NAME_SEARCH_ORDER.map(|bucket| bucket.as_str()),
        ["pathways", "genes", "reactions", "compounds", "proteins"]
    );
    assert_eq!(Bucket::Compounds.synonyms_file_name(), "compounds-synonyms");
}

#[test]
fn detail_levels() {
    for (text, level) in [
        ("none", DetailLevel::None),
        ("low", DetailLevel::Low),
        ("full", DetailLevel::Full),
    ] {
        assert_eq!(text.parse::<DetailLevel>().unwrap(), level);
        assert_eq!(level.to_string(), text);
    }
    assert_matches!(
        "FULL".parse::<DetailLevel>(),
        Err(BiocycError::InvalidDetailLevel(_))
    );
}
