//! Sitemap rendering for the approved set
//!
//! Local listings live under `/listings/<slug>`, global ones under
//! `/global/listings/<slug>`.

use std::fmt::Write;

use crate::domain::Listing;

pub fn listing_url(base_url: &str, listing: &Listing) -> String {
    let base = base_url.trim_end_matches('/');
    if listing.is_global {
        format!("{}/global/listings/{}", base, listing.slug)
    } else {
        format!("{}/listings/{}", base, listing.slug)
    }
}

/// sitemaps.org `urlset` with one `<url>` per listing, in the given order
pub fn render_sitemap(base_url: &str, listings: &[Listing]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for listing in listings {
        // Writing into a String cannot fail
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            escape_xml(&listing_url(base_url, listing)),
            listing.updated_at.format("%Y-%m-%d"),
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
