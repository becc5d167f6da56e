use super::NetError;
use std::collections::HashMap;

/// Parse an RFC 8288 style `Link` header into `rel -> url`.
///
/// ```text
/// <https://host/api/v1/courses/1/folders?page=1&per_page=10>; rel="current",
/// <https://host/api/v1/courses/1/folders?page=2&per_page=10>; rel="next"
/// ```
///
/// Canvas emits one `;` per section; anything else is rejected rather than
/// guessed at. An empty header yields an empty map.
pub fn parse_link_header(header: &str) -> Result<HashMap<String, String>, NetError> {
    let mut links = HashMap::new();
    if header.trim().is_empty() {
        return Ok(links);
    }

    for section in header.split(',') {
        let parts: Vec<&str> = section.split(';').collect();
        let [target, rel] = parts.as_slice() else {
            return Err(NetError::MalformedLinkHeader {
                section: section.trim().to_string(),
            });
        };

        let url = target
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim();
        let rel = rel.trim();
        let name = rel
            .strip_prefix("rel=")
            .map(|v| v.trim_matches('"'))
            .unwrap_or(rel)
            .trim();

        links.insert(name.to_string(), url.to_string());
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10>; rel="current",<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10>; rel="first",<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10>; rel="last""#;
    const CORRUPTED: &str = r#"<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10>; rel="current",<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10>; rel="first",<https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10> rel="last""#;

    #[test]
    fn empty_header_yields_empty_map() {
        assert!(parse_link_header("").unwrap().is_empty());
        assert!(parse_link_header("   ").unwrap().is_empty());
    }

    #[test]
    fn parses_each_relation() {
        let links = parse_link_header(SAMPLE).unwrap();
        let url = "https://canvas.nus.edu.sg/api/v1/courses/63977/folders?page=1&per_page=10";
        assert_eq!(links.len(), 3);
        assert_eq!(links["current"], url);
        assert_eq!(links["first"], url);
        assert_eq!(links["last"], url);
    }

    #[test]
    fn tolerates_whitespace_between_sections() {
        let header = r#"<https://h/a?page=1>; rel="current", <https://h/a?page=2>; rel="next", <https://h/a?page=1>; rel="first", <https://h/a?page=2>; rel="last""#;
        let links = parse_link_header(header).unwrap();
        assert_eq!(links.len(), 4);
        assert_eq!(links["next"], "https://h/a?page=2");
        assert_eq!(links["first"], "https://h/a?page=1");
    }

    #[test]
    fn section_without_semicolon_is_rejected() {
        let err = parse_link_header(CORRUPTED).unwrap_err();
        assert!(matches!(err, NetError::MalformedLinkHeader { .. }));
        assert!(err.to_string().contains("could not be split"));
    }

    #[test]
    fn section_with_extra_semicolon_is_rejected() {
        let err = parse_link_header(r#"<https://h/a>; rel="next"; title="x""#).unwrap_err();
        assert!(err.to_string().contains("could not be split"));
    }
}
