use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use actix_web::HttpRequest;
use actix_web::http::header::ACCEPT_LANGUAGE;
use serde::Deserialize;
use shared::Language;

use super::LANGUAGE_COOKIE;
use crate::config::GeolocationConfig;

const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Relevant part of an ip-api.com lookup.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    /// State code, e.g. `MH`.
    #[serde(default)]
    pub region: String,
}

impl GeoLocation {
    fn in_india(&self) -> bool {
        self.country_code.eq_ignore_ascii_case("IN") || self.country == "India"
    }
}

/// Regional language of an Indian state. Kannada (`KA`) is not offered and
/// falls back to Hindi along with every unlisted state.
pub fn region_language(state_code: &str) -> Language {
    match state_code.trim().to_ascii_uppercase().as_str() {
        "MH" => Language::Mr,
        "TN" => Language::Ta,
        "AP" | "TS" | "TG" => Language::Te,
        "WB" => Language::Bn,
        _ => Language::Hi,
    }
}

pub fn language_for_location(location: &GeoLocation) -> Option<Language> {
    if location.status == "fail" || !location.in_india() {
        return None;
    }
    Some(region_language(&location.region))
}

/// First supported language in an `Accept-Language` header, by q-value.
pub fn parse_accept_language(header: &str) -> Option<Language> {
    let mut ranked: Vec<(f32, Language)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0)
                .then(|| Language::from_code(tag))
                .flatten()
                .map(|language| (quality, language))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.first().map(|(_, language)| *language)
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            let unique_local = (v6.segments()[0] & 0xfe00) == 0xfc00;
            let link_local = (v6.segments()[0] & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

fn client_ip(req: &HttpRequest) -> Option<IpAddr> {
    let info = req.connection_info();
    let raw = info.realip_remote_addr()?;
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}

/// Picks the interface language for a request: the `language` cookie, the
/// `lang` query parameter, IP geolocation, `Accept-Language`, then English.
#[derive(Clone)]
pub struct LanguageDetector {
    client: reqwest::Client,
    endpoint: String,
    enabled: bool,
}

impl LanguageDetector {
    pub fn new(config: &GeolocationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(GEOLOCATION_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            enabled: config.enabled,
        })
    }

    pub async fn detect(&self, req: &HttpRequest) -> Language {
        if let Some(chosen) = Self::explicit(req) {
            return chosen;
        }
        if let Some(located) = self.geolocate(req).await {
            return located;
        }
        Self::from_headers(req)
    }

    /// Same order as [`LanguageDetector::detect`] minus the network lookup.
    pub fn detect_local(req: &HttpRequest) -> Language {
        Self::explicit(req).unwrap_or_else(|| Self::from_headers(req))
    }

    fn explicit(req: &HttpRequest) -> Option<Language> {
        if let Some(cookie) = req.cookie(LANGUAGE_COOKIE) {
            if let Some(language) = Language::from_code(cookie.value()) {
                return Some(language);
            }
        }
        url::form_urlencoded::parse(req.query_string().as_bytes())
            .find(|(key, _)| key == "lang")
            .and_then(|(_, value)| Language::from_code(&value))
    }

    fn from_headers(req: &HttpRequest) -> Language {
        req.headers()
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_accept_language)
            .unwrap_or_default()
    }

    async fn geolocate(&self, req: &HttpRequest) -> Option<Language> {
        if !self.enabled {
            return None;
        }
        let ip = client_ip(req).filter(|ip| is_public(*ip))?;
        let url = format!("{}/{}", self.endpoint, ip);

        let lookup = async {
            self.client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<GeoLocation>()
                .await
        };
        match lookup.await {
            Ok(location) => language_for_location(&location),
            Err(e) => {
                log::warn!("Geolocation lookup for {} failed: {}", ip, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    fn detector() -> LanguageDetector {
        LanguageDetector::new(&GeolocationConfig {
            enabled: true,
            endpoint: "http://127.0.0.1:9/json".into(),
        })
        .unwrap()
    }

    #[test]
    fn states_map_to_regional_languages() {
        assert_eq!(region_language("MH"), Language::Mr);
        assert_eq!(region_language("tn"), Language::Ta);
        assert_eq!(region_language("TG"), Language::Te);
        assert_eq!(region_language("WB"), Language::Bn);
        assert_eq!(region_language("KA"), Language::Hi);
        assert_eq!(region_language("DL"), Language::Hi);
    }

    #[test]
    fn lookups_outside_india_are_ignored() {
        let outside: GeoLocation = serde_json::from_str(
            r#"{"status":"success","country":"Germany","countryCode":"DE","region":"BE"}"#,
        )
        .unwrap();
        assert_eq!(language_for_location(&outside), None);

        let chennai: GeoLocation = serde_json::from_str(
            r#"{"status":"success","country":"India","countryCode":"IN","region":"TN"}"#,
        )
        .unwrap();
        assert_eq!(language_for_location(&chennai), Some(Language::Ta));

        let failed: GeoLocation =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert_eq!(language_for_location(&failed), None);
    }

    #[test]
    fn accept_language_respects_quality() {
        assert_eq!(parse_accept_language("en-US,en;q=0.9,hi;q=0.8"), Some(Language::En));
        assert_eq!(parse_accept_language("fr;q=1.0, ta;q=0.4, bn;q=0.7"), Some(Language::Bn));
        assert_eq!(parse_accept_language("hi;q=0, de"), None);
        assert_eq!(parse_accept_language(""), None);
    }

    #[test]
    fn private_addresses_are_not_looked_up() {
        assert!(!is_public("127.0.0.1".parse().unwrap()));
        assert!(!is_public("192.168.1.20".parse().unwrap()));
        assert!(!is_public("::1".parse().unwrap()));
        assert!(!is_public("fd00::1".parse().unwrap()));
        assert!(is_public("49.36.10.1".parse().unwrap()));
    }

    #[actix_web::test]
    async fn cookie_beats_query_and_header() {
        let req = TestRequest::default()
            .uri("/api/detect_language?lang=te")
            .cookie(Cookie::new(LANGUAGE_COOKIE, "mr"))
            .insert_header((ACCEPT_LANGUAGE, "bn"))
            .to_http_request();
        assert_eq!(detector().detect(&req).await, Language::Mr);
    }

    #[actix_web::test]
    async fn query_beats_header() {
        let req = TestRequest::default()
            .uri("/api/detect_language?lang=te")
            .insert_header((ACCEPT_LANGUAGE, "bn"))
            .to_http_request();
        assert_eq!(detector().detect(&req).await, Language::Te);
    }

    #[actix_web::test]
    async fn loopback_client_falls_through_to_header() {
        let req = TestRequest::default()
            .peer_addr("127.0.0.1:50000".parse().unwrap())
            .cookie(Cookie::new(LANGUAGE_COOKIE, "xx"))
            .insert_header((ACCEPT_LANGUAGE, "ta-IN,ta;q=0.9"))
            .to_http_request();
        assert_eq!(detector().detect(&req).await, Language::Ta);
    }

    #[test]
    fn nothing_known_means_english() {
        let req = TestRequest::default().uri("/?lang=zz").to_http_request();
        assert_eq!(LanguageDetector::detect_local(&req), Language::En);
    }
}
