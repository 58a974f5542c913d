//! Naming helpers: case conversion and English inflection.
//!
//! Table and model names are derived from content-type ids:
//! `blogPost` → table `blog_posts`, model `BlogPost`.

use convert_case::{Boundary, Case, Casing};

const UNCOUNTABLE: &[&str] = &[
    "audio",
    "deer",
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("woman", "women"),
];

const F_TO_VES: &[(&str, &str)] = &[
    ("calf", "calves"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("shelf", "shelves"),
    ("wife", "wives"),
    ("wolf", "wolves"),
];

/// Singulars ending in `s` that take `es` in the plural
const S_TO_SES: &[&str] = &["alias", "atlas", "bias", "bus", "canvas", "gas", "status"];

const O_TO_OES: &[&str] = &["echo", "hero", "potato", "tomato", "veto"];

/// Lowercase snake case (`heroImage` → `hero_image`)
///
/// Digits stay attached to the preceding word (`address2`, `h1_title`).
pub fn snake(value: &str) -> String {
    value
        .remove_boundaries(&[Boundary::LowerDigit, Boundary::UpperDigit, Boundary::DigitLower])
        .to_case(Case::Snake)
        .to_lowercase()
}

/// Studly (Pascal) case (`hero_image` → `HeroImage`)
pub fn studly(value: &str) -> String {
    value.to_case(Case::Pascal)
}

/// Pluralize the last segment of a snake-case word (`blog_post` → `blog_posts`)
pub fn plural(word: &str) -> String {
    map_last_segment(word, plural_segment)
}

/// Singularize the last segment of a snake-case word (`blog_posts` → `blog_post`)
pub fn singular(word: &str) -> String {
    map_last_segment(word, singular_segment)
}

/// Mirror table for a content type: prefix + plural snake case of its id
pub fn table_name(prefix: &str, content_type_id: &str) -> String {
    format!("{prefix}{}", plural(&snake(content_type_id)))
}

/// Model name for a content type: studly singular of its table name
pub fn model_name(prefix: &str, content_type_id: &str) -> String {
    studly(&singular(&table_name(prefix, content_type_id)))
}

fn map_last_segment(word: &str, inflect: fn(&str) -> String) -> String {
    match word.rsplit_once('_') {
        Some((head, last)) if !last.is_empty() => format!("{head}_{}", inflect(last)),
        _ => inflect(word),
    }
}

fn plural_segment(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return lower;
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(one, many)| *one == lower || *many == lower) {
        return (*plural).to_string();
    }
    if singular_segment(&lower) != lower {
        return lower;
    }
    if let Some((_, plural)) = F_TO_VES.iter().find(|(one, _)| *one == lower) {
        return (*plural).to_string();
    }
    if O_TO_OES.contains(&lower.as_str()) {
        return format!("{lower}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if !stem.ends_with(is_vowel) && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }
    if let Some(stem) = lower.strip_suffix("is") {
        return format!("{stem}es");
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{lower}es");
    }
    format!("{lower}s")
}

fn singular_segment(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return lower;
    }
    if let Some((one, _)) = IRREGULAR.iter().find(|(one, many)| *many == lower || *one == lower) {
        return (*one).to_string();
    }
    if S_TO_SES.contains(&lower.as_str()) {
        return lower;
    }
    if let Some(stem) = lower.strip_suffix("es") {
        if S_TO_SES.contains(&stem) {
            return stem.to_string();
        }
    }
    if let Some((one, _)) = F_TO_VES.iter().find(|(_, many)| *many == lower) {
        return (*one).to_string();
    }
    if let Some(stem) = lower.strip_suffix("oes") {
        if O_TO_OES.iter().any(|word| word.strip_suffix('o') == Some(stem)) {
            return format!("{stem}o");
        }
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = lower.strip_suffix("yses") {
        return format!("{stem}ysis");
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if ["ss", "us", "is"].iter().any(|suffix| lower.ends_with(suffix)) {
        return lower;
    }
    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_and_studly() {
        assert_eq!(snake("heroImage"), "hero_image");
        assert_eq!(snake("title"), "title");
        assert_eq!(snake("related_articles"), "related_articles");
        assert_eq!(studly("hero_image"), "HeroImage");
        assert_eq!(studly("article"), "Article");
    }

    #[test]
    fn snake_keeps_digits_attached() {
        assert_eq!(snake("address2"), "address2");
        assert_eq!(snake("h1Title"), "h1_title");
        assert_eq!(snake("image2x"), "image2x");
        assert_eq!(table_name("", "address2"), "address2s");
    }

    #[test]
    fn words_ending_in_s_take_es() {
        assert_eq!(plural("alias"), "aliases");
        assert_eq!(plural("aliases"), "aliases");
        assert_eq!(singular("aliases"), "alias");
        assert_eq!(singular("alias"), "alias");
        assert_eq!(singular("statuses"), "status");
        assert_eq!(singular("buses"), "bus");
        assert_eq!(singular("ideas"), "idea");
        assert_eq!(table_name("", "alias"), "aliases");
        assert_eq!(table_name("", "canvas"), "canvases");
        assert_eq!(table_name("", "gas"), "gases");
        assert_eq!(model_name("", "alias"), "Alias");
        assert_eq!(model_name("", "canvas"), "Canvas");
        assert_eq!(model_name("", "gas"), "Gas");
    }

    #[test]
    fn pluralizes_regular_words() {
        assert_eq!(plural("article"), "articles");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("day"), "days");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("branch"), "branches");
        assert_eq!(plural("bus"), "buses");
        assert_eq!(plural("blog_post"), "blog_posts");
    }

    #[test]
    fn pluralizes_irregular_and_uncountable_words() {
        assert_eq!(plural("person"), "people");
        assert_eq!(plural("leaf"), "leaves");
        assert_eq!(plural("hero"), "heroes");
        assert_eq!(plural("analysis"), "analyses");
        assert_eq!(plural("news"), "news");
        assert_eq!(plural("team_person"), "team_people");
    }

    #[test]
    fn plural_of_plural_is_stable() {
        assert_eq!(plural("articles"), "articles");
        assert_eq!(plural("categories"), "categories");
        assert_eq!(plural("people"), "people");
    }

    #[test]
    fn singularizes() {
        assert_eq!(singular("articles"), "article");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("courses"), "course");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("leaves"), "leaf");
        assert_eq!(singular("heroes"), "hero");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("blog_posts"), "blog_post");
    }

    #[test]
    fn table_and_model_names() {
        assert_eq!(table_name("", "article"), "articles");
        assert_eq!(table_name("", "blogPost"), "blog_posts");
        assert_eq!(table_name("cf_", "category"), "cf_categories");
        assert_eq!(model_name("", "blogPost"), "BlogPost");
        assert_eq!(model_name("", "category"), "Category");
        assert_eq!(model_name("cf_", "article"), "CfArticle");
        assert_eq!(model_name("", "asset"), "Asset");
    }
}
