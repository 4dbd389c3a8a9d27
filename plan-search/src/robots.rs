//! robots.txt compliance lookup.
//!
//! Reports the paths a site asks every crawler to stay out of. Discovery
//! itself only reads search results pages and never consults this; it is
//! offered to callers that go on to fetch from a site directly.

use std::time::Duration;

use url::Url;

/// Time allowed for fetching a robots file.
const ROBOTS_TIMEOUT: Duration = Duration::from_secs(5);

/// `Disallow` paths that apply to `User-agent: *`, in file order.
///
/// Consecutive `User-agent` lines form one group; the group applies when
/// any of its agents is `*`.
pub fn parse_disallowed(content: &str) -> Vec<String> {
    let mut disallowed = Vec::new();
    let mut applies = false;
    let mut reading_agents = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match directive.trim().to_lowercase().as_str() {
            "user-agent" => {
                if !reading_agents {
                    applies = false;
                    reading_agents = true;
                }
                applies |= value == "*";
            }
            "disallow" => {
                reading_agents = false;
                if applies && !value.is_empty() {
                    disallowed.push(value.to_string());
                }
            }
            _ => reading_agents = false,
        }
    }

    disallowed
}

/// Fetch `/robots.txt` for the site hosting `url` and return its
/// disallowed paths for all agents.
///
/// Permissive on failure: an unparsable URL, a transport error or any
/// status other than 200 gives an empty list.
pub async fn disallowed_paths(client: &reqwest::Client, url: &str) -> Vec<String> {
    let Some(robots_url) = robots_url(url) else {
        tracing::warn!(url, "cannot derive robots.txt location");
        return Vec::new();
    };

    let response = match client.get(&robots_url).timeout(ROBOTS_TIMEOUT).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(url = %robots_url, error = %err, "robots.txt fetch failed");
            return Vec::new();
        }
    };
    if response.status().as_u16() != 200 {
        tracing::info!(url = %robots_url, status = response.status().as_u16(), "no robots.txt");
        return Vec::new();
    }

    match response.text().await {
        Ok(content) => parse_disallowed(&content),
        Err(err) => {
            tracing::warn!(url = %robots_url, error = %err, "robots.txt read failed");
            Vec::new()
        }
    }
}

/// `{scheme}://{host}[:port]/robots.txt` for the site hosting `url`.
pub fn robots_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    parsed.set_path("/robots.txt");
    parsed.set_query(None);
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_wildcard_disallows() {
        let content = r#"
# comment
User-agent: *
Disallow: /private/
Disallow: /admin/  # staff only
Allow: /public/
Disallow:

User-agent: Googlebot
Disallow: /no-google/
"#;
        assert_eq!(parse_disallowed(content), vec!["/private/", "/admin/"]);
    }

    #[test]
    fn grouped_agents_share_rules() {
        let content = "User-agent: Bingbot\nUser-agent: *\nDisallow: /tmp/\n\nUser-agent: other\nDisallow: /x/\n";
        assert_eq!(parse_disallowed(content), vec!["/tmp/"]);
    }

    #[test]
    fn directives_are_case_insensitive() {
        assert_eq!(
            parse_disallowed("USER-AGENT: *\nDISALLOW: /Board/\n"),
            vec!["/Board/"]
        );
    }

    #[test]
    fn empty_file_disallows_nothing() {
        assert!(parse_disallowed("").is_empty());
        assert!(parse_disallowed("User-agent: foo\nDisallow: /\n").is_empty());
    }

    #[test]
    fn robots_location() {
        assert_eq!(
            robots_url("https://www.maywood89.org/docs/plan.pdf?x=1#p").as_deref(),
            Some("https://www.maywood89.org/robots.txt")
        );
        assert_eq!(
            robots_url("http://127.0.0.1:8080/a").as_deref(),
            Some("http://127.0.0.1:8080/robots.txt")
        );
        assert!(robots_url("ftp://example.org/").is_none());
        assert!(robots_url("nonsense").is_none());
    }

    #[tokio::test]
    async fn unreachable_site_is_permissive() {
        let client = reqwest::Client::new();
        assert!(disallowed_paths(&client, "http://127.0.0.1:1/").await.is_empty());
    }
}
