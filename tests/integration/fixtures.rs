//! Shared test configuration and HTML fixtures

use rating_vault::config::{Config, NetworkConfig};
use rating_vault::scrape::{Fetcher, RetryPolicy, ScrapeSettings, Scraper, SiteUrls};
use rating_vault::Language;
use std::time::Duration;

/// Creates a configuration pointed at `base_url` with no pacing delays
pub fn test_config(base_url: &str, lang: Language) -> Config {
    Config {
        base_url: base_url.to_string(),
        lang,
        network: NetworkConfig {
            max_retries: 3,
            timeout_secs: 5.0,
            connect_timeout_secs: 2.0,
            rate_limit_cooldown_secs: 0.01,
            rate_limit_cooldown_max_secs: 0.04,
            backoff_step_secs: 0.01,
            page_delay_secs: 0.0,
            detail_delay_secs: 0.0,
        },
        ..Default::default()
    }
}

/// Retry policy with millisecond waits
pub fn fast_policy(max_retries: u32, timeout: Duration) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        timeout,
        rate_limit_cooldown: Duration::from_millis(10),
        rate_limit_cooldown_max: Duration::from_millis(40),
        backoff_step: Duration::from_millis(10),
    }
}

pub fn fetcher(config: &Config) -> Fetcher {
    Fetcher::from_config(&config.network).expect("client builds")
}

pub fn scraper<'a>(fetcher: &'a Fetcher, config: &Config) -> Scraper<'a> {
    let urls = SiteUrls::new(&config.base_url, config.lang).expect("valid base url");
    Scraper::new(fetcher, urls, ScrapeSettings::from(config))
}

/// One movie card as rendered by the site
pub fn card(id: &str, label: &str, country: &str) -> String {
    format!(
        r#"<div class="movie-card" data-movie-id="{id}">
             <div class="mc-title"><a href="/en/film{id}.html">{label}</a></div>
             <span class="mc-year">2001</span>
             <img class="nflag" alt="{country}" src="/imgs/flag.png">
             <div class="mc-director"><a href="/d">Some Director</a></div>
             <div class="avg">7.5</div>
           </div>"#
    )
}

/// A rating-history page; each entry is `(id, title, user score)`
pub fn watched_page(entries: &[(&str, &str, &str)]) -> String {
    let rows: String = entries
        .iter()
        .map(|(id, title, score)| {
            format!(
                r#"<div class="row mb-4"><div class="fa-user-rat-box">{score}</div>{}</div>"#,
                card(id, title, "Japan")
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="user-ratings-list-resp">{rows}</div></body></html>"#
    )
}

/// A named-list page; each entry is `(id, title, user score)`
pub fn list_page(title: &str, entries: &[(&str, &str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(id, label, score)| {
            format!(
                r#"<li>{}<div class="fa-user-rat-box">{score}</div></li>"#,
                card(id, label, "France")
            )
        })
        .collect();
    format!(
        r#"<html><body><span class="fs-5">List: {title}</span>
           <ul class="fa-list-group">{items}</ul></body></html>"#
    )
}

/// A user-lists page; each entry is `(name, href)`
pub fn lists_page(entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<li><a class="ls-imgs" href="{href}"><img src="/x.png"></a><a href="{href}">{name}</a></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><ul class="fa-list-group">{items}</ul></body></html>"#)
}

/// A movie detail page carrying an original title
pub fn detail_page(original: &str) -> String {
    format!(
        r#"<html><body><dl class="movie-info">
             <dt>Título original</dt><dd>{original}</dd>
             <dt>Año</dt><dd>2001</dd>
           </dl></body></html>"#
    )
}
