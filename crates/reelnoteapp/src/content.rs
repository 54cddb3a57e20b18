//! # Generated Sections
//!
//! Renders markdown from a catalog detail map. The output goes inside the
//! note's generated block (see [`crate::block`]); the renderer knows nothing
//! about notes.
//!
//! ## Sections
//!
//! - `overview`: `## Overview`, the plot summary and the tagline as a quote.
//! - `info`: `## Movie Info` or `## Series Info`, a two column table.
//! - `seasons`: `## Seasons`, one entry per season. TV only.
//!
//! Sections without data render nothing. Rendered sections are joined by a
//! blank line.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::catalog::Details;
use crate::error::ReelnoteError;
use crate::model::MediaKind;

const SEASON_POSTER_BASE: &str = "https://image.tmdb.org/t/p/w300";
const MAX_ORIGIN_COUNTRIES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Overview,
    Info,
    Seasons,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Info => "info",
            Section::Seasons => "seasons",
        }
    }

    pub fn defaults_for(kind: MediaKind) -> Vec<Section> {
        match kind {
            MediaKind::Movie => vec![Section::Overview, Section::Info],
            MediaKind::Tv => vec![Section::Overview, Section::Info, Section::Seasons],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = ReelnoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Section::Overview),
            "info" => Ok(Section::Info),
            "seasons" => Ok(Section::Seasons),
            other => Err(ReelnoteError::Input(format!("unknown content section: {other}"))),
        }
    }
}

pub trait Renderer {
    /// Empty `sections` means the defaults for `kind`.
    fn render(&self, details: &Details, kind: MediaKind, sections: &[Section]) -> String;
}

impl<R: Renderer + ?Sized> Renderer for &R {
    fn render(&self, details: &Details, kind: MediaKind, sections: &[Section]) -> String {
        (**self).render(details, kind, sections)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, details: &Details, kind: MediaKind, sections: &[Section]) -> String {
        let defaults;
        let sections = if sections.is_empty() {
            defaults = Section::defaults_for(kind);
            &defaults[..]
        } else {
            sections
        };

        sections
            .iter()
            .filter_map(|section| match section {
                Section::Overview => overview(details),
                Section::Info => Some(info(details, kind)),
                Section::Seasons if kind == MediaKind::Tv => seasons(details),
                Section::Seasons => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn overview(details: &Details) -> Option<String> {
    let text = str_val(details, "overview").trim();
    if text.is_empty() {
        return None;
    }
    let mut out = format!("## Overview\n\n{text}");
    let tagline = str_val(details, "tagline").trim();
    if !tagline.is_empty() {
        out.push_str(&format!("\n\n> _\"{tagline}\"_"));
    }
    Some(out)
}

fn info(details: &Details, kind: MediaKind) -> String {
    let is_tv = kind == MediaKind::Tv;
    let mut rows: Vec<(&str, String)> = Vec::new();

    let status = match str_val(details, "status") {
        "" => "Unknown",
        s => s,
    };
    let in_production = bool_val(details, "in_production");
    if is_tv && in_production {
        rows.push(("Status", format!("{status} (In Production)")));
    } else {
        rows.push(("Status", status.to_string()));
    }

    if is_tv {
        let seasons = int_val(details, "number_of_seasons").unwrap_or(0);
        let episodes = int_val(details, "number_of_episodes").unwrap_or(0);
        rows.push(("Seasons", format!("{seasons} ({episodes} episodes)")));

        let first = str_val(details, "first_air_date");
        let last = str_val(details, "last_air_date");
        if !first.is_empty() {
            let aired = if !last.is_empty() && last != first {
                format!("{first} → {last}")
            } else if in_production {
                format!("{first} → Present")
            } else {
                first.to_string()
            };
            rows.push(("Aired", aired));
        }
    } else {
        if let Some(runtime) = int_val(details, "runtime").filter(|r| *r > 0) {
            rows.push(("Runtime", format!("{runtime} min")));
        }
        let release = str_val(details, "release_date");
        if !release.is_empty() {
            rows.push(("Released", release.to_string()));
        }
    }

    if let Some(rating) = float_val(details, "vote_average").filter(|r| *r > 0.0) {
        let votes = int_val(details, "vote_count").unwrap_or(0);
        rows.push((
            "Rating",
            format!("⭐ {:.1}/10 ({} votes)", rating, format_number(votes)),
        ));
    }

    if is_tv {
        if let Some(network) = first_nested_str(details, "networks", "name") {
            rows.push(("Network", network.to_string()));
        }
    } else {
        if let Some(budget) = int_val(details, "budget").filter(|b| *b > 0) {
            rows.push(("Budget", format!("${}", format_number(budget))));
        }
        if let Some(revenue) = int_val(details, "revenue").filter(|r| *r > 0) {
            rows.push(("Revenue", format!("${}", format_number(revenue))));
        }
    }

    let countries = str_list(details, "origin_country");
    if !countries.is_empty() {
        let origin = countries
            .iter()
            .take(MAX_ORIGIN_COUNTRIES)
            .map(|code| format!("{} {}", country_flag(code), code))
            .collect::<Vec<_>>()
            .join(" ");
        rows.push(("Origin", origin));
    }

    if is_tv {
        if let Some(rating) = us_content_rating(details) {
            rows.push(("Content Rating", rating.to_string()));
        }
    }

    let external_ids = details.get("external_ids").and_then(Value::as_object);
    if let Some(imdb) = external_ids.map(|ids| str_val(ids, "imdb_id")).filter(|s| !s.is_empty()) {
        rows.push((
            "IMDB",
            format!("[imdb.com/title/{imdb}](https://www.imdb.com/title/{imdb}/)"),
        ));
    }
    if let Some(tvdb) = external_ids.and_then(|ids| scalar_text(ids, "tvdb_id")) {
        rows.push((
            "TVDB",
            format!("[thetvdb.com/{tvdb}](https://thetvdb.com/series/{tvdb})"),
        ));
    }

    let homepage = str_val(details, "homepage");
    if !homepage.is_empty() {
        rows.push((
            "Homepage",
            format!("[{}]({})", friendly_homepage_name(homepage), homepage),
        ));
    }

    let heading = if is_tv { "Series Info" } else { "Movie Info" };
    let mut out = format!("## {heading}\n\n| | |\n|---|---|");
    for (label, value) in rows {
        out.push_str(&format!("\n| **{label}** | {value} |"));
    }
    out
}

fn seasons(details: &Details) -> Option<String> {
    let seasons = details.get("seasons").and_then(Value::as_array)?;
    let in_production = bool_val(details, "in_production");
    let last_index = seasons.len().checked_sub(1)?;

    let mut entries = Vec::new();
    for (index, season) in seasons.iter().enumerate() {
        let Some(season) = season.as_object() else {
            continue;
        };

        let name = match str_val(season, "name") {
            "" => match int_val(season, "season_number") {
                Some(n) => format!("Season {n}"),
                None => "Season".to_string(),
            },
            name => name.to_string(),
        };
        let air_date = str_val(season, "air_date");
        let year: String = if air_date.chars().count() >= 4 {
            air_date.chars().take(4).collect()
        } else {
            "TBA".to_string()
        };

        let mut entry = format!("### {name} ({year})");
        if let Some(vote) = float_val(season, "vote_average").filter(|v| *v > 0.0) {
            entry.push_str(&format!(" • ⭐ {vote:.1}/10"));
        }
        entry.push_str("\n\n");

        let poster = str_val(season, "poster_path");
        if !poster.is_empty() {
            entry.push_str(&format!("![{name}]({SEASON_POSTER_BASE}{poster})\n\n"));
        }
        let overview = str_val(season, "overview").trim();
        if !overview.is_empty() {
            entry.push_str(&format!("_{overview}_\n\n"));
        }

        let episodes = int_val(season, "episode_count").unwrap_or(0);
        let status = if index == last_index && in_production {
            "Currently Airing"
        } else {
            "✅ Complete"
        };
        entry.push_str(&format!("**Episodes:** {episodes} • **Status:** {status}\n\n---"));
        entries.push(entry);
    }

    if entries.is_empty() {
        return None;
    }
    Some(format!("## Seasons\n\n{}", entries.join("\n\n")))
}

fn str_val<'a>(map: &'a Map<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or("")
}

fn int_val(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float_val(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

fn bool_val(map: &Map<String, Value>, key: &str) -> bool {
    match map.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// String or integer value as text; TMDB sends some ids as numbers.
fn scalar_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn str_list<'a>(map: &'a Map<String, Value>, key: &str) -> Vec<&'a str> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn first_nested_str<'a>(map: &'a Map<String, Value>, key: &str, nested: &str) -> Option<&'a str> {
    map.get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| str_val(obj, nested))
        .find(|s| !s.is_empty())
}

fn us_content_rating(details: &Details) -> Option<&str> {
    details
        .get("content_ratings")?
        .get("results")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .find(|entry| str_val(entry, "iso_3166_1").eq_ignore_ascii_case("US"))
        .map(|entry| str_val(entry, "rating"))
        .filter(|rating| !rating.is_empty())
}

pub fn friendly_homepage_name(url: &str) -> &'static str {
    const KNOWN: [(&str, &str); 8] = [
        ("apple.com", "Apple TV+"),
        ("netflix.com", "Netflix"),
        ("hulu.com", "Hulu"),
        ("disneyplus.com", "Disney+"),
        ("primevideo.com", "Prime Video"),
        ("amazon.com", "Prime Video"),
        ("hbo.com", "Max"),
        ("max.com", "Max"),
    ];
    KNOWN
        .iter()
        .find(|(domain, _)| url.contains(domain))
        .map(|(_, name)| *name)
        .unwrap_or("Official Website")
}

/// Regional indicator pair for a two-letter country code, or a globe.
pub fn country_flag(code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_uppercase) {
        return "🌐".to_string();
    }
    bytes
        .iter()
        .filter_map(|b| char::from_u32(0x1F1E6 + u32::from(b - b'A')))
        .collect()
}

/// Thousands separators: `1234567` becomes `1,234,567`.
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
