use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Plaintext form of a BioCyc HTML label: tags dropped, entities decoded.
pub fn strip_markup(html: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static ENTITIES: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
    let entities = ENTITIES.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);")
            .expect("entity pattern is valid")
    });

    let without_tags = tags.replace_all(html, "");
    let decoded = entities.replace_all(&without_tags, |caps: &Captures<'_>| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(hex) = name
        .strip_prefix("#x")
        .or_else(|| name.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse().ok().and_then(char::from_u32).map(String::from);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "delta" => 'δ',
        "Delta" => 'Δ',
        "epsilon" => 'ε',
        "kappa" => 'κ',
        "lambda" => 'λ',
        "mu" => 'μ',
        "omega" => 'ω',
        "psi" => 'ψ',
        "rarr" => '→',
        "larr" => '←',
        "harr" => '↔',
        "plusmn" => '±',
        "middot" => '·',
        "prime" => '′',
        "Prime" => '″',
        "mdash" => '—',
        "ndash" => '–',
        _ => return None,
    };
    Some(ch.to_string())
}
