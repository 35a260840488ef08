use std::collections::BTreeMap;

use url::Url;

use leadfinder_common::{
    EnrichmentMethod, EnrichmentRecord, SocialNetwork, REASON_LINKED_FROM_WEBSITE,
    WEBSITE_SOCIAL_CONFIDENCE,
};

use super::links::extract_links;

/// Registrable domain → network. Legacy twitter.com folds into `x`.
const SOCIAL_DOMAINS: &[(&str, SocialNetwork)] = &[
    ("instagram.com", SocialNetwork::Instagram),
    ("facebook.com", SocialNetwork::Facebook),
    ("linkedin.com", SocialNetwork::Linkedin),
    ("tiktok.com", SocialNetwork::Tiktok),
    ("x.com", SocialNetwork::X),
    ("twitter.com", SocialNetwork::X),
    ("youtube.com", SocialNetwork::Youtube),
];

/// Exact host or any subdomain of it (`www.`, `m.`, `ca.`).
pub fn network_for_host(host: &str) -> Option<SocialNetwork> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    SOCIAL_DOMAINS.iter().find_map(|(domain, network)| {
        let matches = host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'));
        matches.then_some(*network)
    })
}

/// First URL per network, in link order, plus one reason per network found.
pub fn pick_socials(links: &[Url]) -> (BTreeMap<SocialNetwork, String>, Vec<String>) {
    let mut socials = BTreeMap::new();
    let mut reasons = Vec::new();

    for link in links {
        let Some(network) = link.host_str().and_then(network_for_host) else {
            continue;
        };
        if socials.contains_key(&network) {
            continue;
        }
        socials.insert(network, link.to_string());
        reasons.push(REASON_LINKED_FROM_WEBSITE.to_string());
    }

    (socials, reasons)
}

/// Mine a fetched website body for social profile links. `None` when the
/// page links to no known network.
pub fn socials_from_page(html: &str, page_url: &str) -> Option<EnrichmentRecord> {
    let links = extract_links(html, page_url);
    let (socials, reasons) = pick_socials(&links);
    if socials.is_empty() {
        return None;
    }
    Some(EnrichmentRecord {
        socials,
        confidence: WEBSITE_SOCIAL_CONFIDENCE,
        reasons,
        source: EnrichmentMethod::Website,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_match_on_domain_boundary() {
        assert_eq!(network_for_host("instagram.com"), Some(SocialNetwork::Instagram));
        assert_eq!(network_for_host("www.instagram.com"), Some(SocialNetwork::Instagram));
        assert_eq!(network_for_host("M.FACEBOOK.COM"), Some(SocialNetwork::Facebook));
        assert_eq!(network_for_host("ca.linkedin.com"), Some(SocialNetwork::Linkedin));
        assert_eq!(network_for_host("twitter.com"), Some(SocialNetwork::X));
        assert_eq!(network_for_host("fox.com"), None);
        assert_eq!(network_for_host("notinstagram.com"), None);
        assert_eq!(network_for_host("instagram.com.evil.example"), None);
    }

    #[test]
    fn single_instagram_link() {
        let html = r#"<a href="https://www.instagram.com/acme">Follow us</a>"#;
        let record = socials_from_page(html, "https://acme.example").unwrap();

        assert_eq!(
            record.socials,
            BTreeMap::from([(SocialNetwork::Instagram, "https://www.instagram.com/acme".to_string())])
        );
        assert_eq!(record.confidence, 0.95);
        assert_eq!(record.reasons, vec!["linked_from_website"]);
        assert_eq!(record.source, EnrichmentMethod::Website);
    }

    #[test]
    fn first_link_per_network_wins_and_x_aliases_collapse() {
        let html = r#"
            <a href="https://twitter.com/acme_old">t</a>
            <a href="https://x.com/acme">x</a>
            <a href="https://www.youtube.com/@acme">yt</a>
            <a href="https://www.youtube.com/@acme-2">yt2</a>
            <a href="https://fox.com/news">news</a>
        "#;
        let record = socials_from_page(html, "https://acme.example").unwrap();

        assert_eq!(record.socials.len(), 2);
        assert_eq!(record.socials[&SocialNetwork::X], "https://twitter.com/acme_old");
        assert_eq!(record.socials[&SocialNetwork::Youtube], "https://www.youtube.com/@acme");
        assert_eq!(record.reasons.len(), 2);
    }

    #[test]
    fn page_without_socials_yields_nothing() {
        let html = r#"<a href="/menu">Menu</a><a href="https://maps.google.com/?q=acme">Map</a>"#;
        assert!(socials_from_page(html, "https://acme.example").is_none());
    }
}
