//! Resolution of search results to a single organization.

use std::sync::LazyLock;

use bfo_core::{BfoError, Organization, Result};
use regex::Regex;
use tracing::debug;

use crate::wire::{SearchHit, SearchResponse};

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html tag pattern"));

/// Number of candidates listed in an [`BfoError::Ambiguous`] message.
const AMBIGUOUS_PREVIEW: usize = 5;

/// Decodes HTML entities and removes tags from search highlighting.
pub(crate) fn clean_html(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    HTML_TAG.replace_all(&decoded, "").into_owned()
}

/// Keeps only Cyrillic and Latin letters, lower-cased.
pub(crate) fn letters_only(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Picks the organization a query refers to.
///
/// A single hit is taken as is. With several hits the one whose INN equals
/// the query wins, then the one whose normalized name equals the normalized
/// query; otherwise the search is ambiguous.
pub(crate) fn resolve(response: SearchResponse, query: &str) -> Result<Organization> {
    let SearchResponse {
        content,
        total_elements,
    } = response;

    if total_elements == 0 || content.is_empty() {
        return Err(BfoError::NotFound(format!(
            "No organizations found for {query:?}"
        )));
    }

    if total_elements == 1 && content.len() == 1 {
        return content.into_iter().next().map_or_else(
            || Err(BfoError::NotFound(query.to_string())),
            into_organization,
        );
    }

    let query = query.trim();
    if let Some(hit) = content
        .iter()
        .find(|hit| hit.inn.as_deref().map(str::trim) == Some(query))
    {
        debug!(query, "Resolved search by exact INN match");
        return into_organization(hit.clone());
    }

    let wanted = letters_only(query);
    let by_name = if wanted.is_empty() {
        None
    } else {
        content
            .iter()
            .find(|hit| letters_only(&clean_html(&hit.short_name)) == wanted)
    };
    if let Some(hit) = by_name {
        debug!(query, "Resolved search by exact name match");
        return into_organization(hit.clone());
    }

    Err(BfoError::Ambiguous(ambiguous_message(&content, total_elements)))
}

fn ambiguous_message(content: &[SearchHit], total: u64) -> String {
    let mut message = format!("Multiple organizations found ({total} total). First few matches:");
    for hit in content.iter().take(AMBIGUOUS_PREVIEW) {
        message.push_str(&format!(
            "\nID: {}, INN: {}, Name: {}",
            hit.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            hit.inn.as_deref().unwrap_or("?"),
            clean_html(&hit.short_name),
        ));
    }
    let shown = content.len().min(AMBIGUOUS_PREVIEW) as u64;
    if total > shown {
        message.push_str(&format!("\n... and {} more", total - shown));
    }
    message
}

fn into_organization(hit: SearchHit) -> Result<Organization> {
    let id = hit
        .id
        .ok_or_else(|| BfoError::Parse("Organization id missing in search response".to_string()))?;

    Ok(Organization {
        id,
        inn: hit.inn,
        ogrn: hit.ogrn,
        short_name: clean_html(&hit.short_name),
        region: hit.region,
        status_code: hit.status_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: u64, inn: &str, name: &str) -> SearchHit {
        SearchHit {
            id: Some(id),
            inn: Some(inn.to_string()),
            short_name: name.to_string(),
            ..Default::default()
        }
    }

    fn response(content: Vec<SearchHit>, total: u64) -> SearchResponse {
        SearchResponse {
            content,
            total_elements: total,
        }
    }

    #[test]
    fn test_clean_html() {
        assert_eq!(
            clean_html("<strong>ООО</strong> &quot;<strong>ПЛАЗЛЭЙ</strong>&quot;"),
            "ООО \"ПЛАЗЛЭЙ\""
        );
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_letters_only() {
        assert_eq!(letters_only("ООО \"Плазлэй-1\""), "оооплазлэй");
        assert_eq!(letters_only("Ёлка & Co."), "ёлкаco");
    }

    #[test]
    fn test_no_hits_is_not_found() {
        let err = resolve(response(vec![], 0), "7735146464").unwrap_err();
        assert!(matches!(err, BfoError::NotFound(_)));
    }

    #[test]
    fn test_single_hit() {
        let org = resolve(
            response(vec![hit(9392519, "7735146464", "<strong>ООО</strong> ПЛАЗЛЭЙ")], 1),
            "7735146464",
        )
        .unwrap();
        assert_eq!(org.id, 9392519);
        assert_eq!(org.short_name, "ООО ПЛАЗЛЭЙ");
    }

    #[test]
    fn test_single_hit_without_id_is_parse_error() {
        let mut h = hit(1, "1", "x");
        h.id = None;
        assert!(matches!(
            resolve(response(vec![h], 1), "1"),
            Err(BfoError::Parse(_))
        ));
    }

    #[test]
    fn test_multiple_hits_exact_inn() {
        let org = resolve(
            response(
                vec![hit(1, "7735146460", "A"), hit(2, "7735146464", "B")],
                2,
            ),
            "7735146464",
        )
        .unwrap();
        assert_eq!(org.id, 2);
    }

    #[test]
    fn test_multiple_hits_exact_name() {
        let org = resolve(
            response(
                vec![
                    hit(1, "1", "<strong>ООО</strong> \"ПЛАЗЛЭЙ ГРУПП\""),
                    hit(2, "2", "<strong>ООО</strong> &quot;ПЛАЗЛЭЙ&quot;"),
                ],
                2,
            ),
            "ООО ПЛАЗЛЭЙ",
        )
        .unwrap();
        assert_eq!(org.id, 2);
        assert_eq!(org.short_name, "ООО \"ПЛАЗЛЭЙ\"");
    }

    #[test]
    fn test_multiple_hits_ambiguous() {
        let content = (1..=7).map(|i| hit(i, &i.to_string(), "Рога и копыта")).collect();
        let err = resolve(response(content, 12), "Рога").unwrap_err();
        let BfoError::Ambiguous(message) = err else {
            panic!("expected ambiguous error, got {err:?}");
        };
        assert!(message.contains("12 total"));
        assert!(message.contains("ID: 5"));
        assert!(!message.contains("ID: 6"));
        assert!(message.contains("... and 7 more"));
    }
}
