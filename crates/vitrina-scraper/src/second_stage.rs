//! Second-stage refinement: a pure, offline pass over a finished offer list
//! that tightens precision. Ambiguous labels become an explicit `Unresolved`
//! rather than a possibly-wrong guess, because ranking statistics must not
//! misattribute positions between brands.

use sha2::{Digest, Sha256};
use url::Url;
use vitrina_core::{BrandLabel, ExtractedOffer, Normalizer};

/// Domain fragments for brands whose landing hosts do not match any alias.
/// First hit wins; keys are matched as substrings of the registrable host.
const DOMAIN_BRANDS: &[(&str, &str)] = &[
    ("joy.money", "JoyMoney"),
    ("joymoney", "JoyMoney"),
    ("kredito24", "Kredito24"),
    ("zaymer", "Займер"),
    ("turbozaim", "Турбозайм"),
    ("webbankir", "Webbankir"),
    ("moneyman", "MoneyMan"),
    ("vivus", "Vivus"),
    ("smsfinance", "Смсфинанс"),
    ("lime", "Lime"),
    ("kviku", "Kviku"),
    ("mikkro", "Mikkro"),
    ("web-zaim", "Веб-займ"),
    ("dozarplati", "ДоЗарплаты"),
    ("ekapusta", "Екапуста"),
    ("migcredit", "МигКредит"),
    ("creditplus", "CreditPlus"),
    ("viva", "Viva Деньги"),
    ("adengi", "А-Деньги"),
    ("belkacredit", "БелкаКредит"),
    ("cash-u", "Cash-U"),
    ("dobrozaim", "ДоброЗайм"),
    ("fastmoney", "FastMoney"),
    ("oneclickmoney", "OneClickMoney"),
    ("payps", "Pay P.S."),
    ("pliskov", "Pliskov"),
    ("srochnodengi", "СрочноДеньги"),
    ("umnye-nalichnye", "Умные Наличные"),
    ("zaymigo", "Zaymigo"),
];

/// Technical tokens stripped by the sanitizer before the strict alias check.
const SANITIZE_TOKENS: &[&str] = &[
    ".png", ".svg", ".jpg", ".jpeg", ".gif", "logo", "icon", "image", "brand", "alt", "title",
];

/// Unspaced labels longer than this are treated as hashes/tokens.
const MAX_UNSPACED_CHARS: usize = 50;

/// Refines every non-resolved label in place. `Resolved` labels are final
/// and never touched, so the pass is idempotent: a second invocation finds
/// only fixed points.
pub fn refine(offers: &mut [ExtractedOffer], normalizer: &Normalizer<'_>) {
    let mut fixed = 0_usize;
    let mut demoted = 0_usize;

    for offer in offers.iter_mut() {
        if offer.label.is_resolved() {
            continue;
        }
        let before_unresolved = offer.label == BrandLabel::Unresolved;
        offer.label = refine_label(&offer.label, &offer.link, normalizer);
        match &offer.label {
            BrandLabel::Resolved(_) => fixed += 1,
            BrandLabel::Unresolved if !before_unresolved => demoted += 1,
            _ => {}
        }
    }

    tracing::info!(fixed, demoted, "second stage finished");
}

/// Ordered refinement tactics for one label; first success wins.
fn refine_label(label: &BrandLabel, link: &str, normalizer: &Normalizer<'_>) -> BrandLabel {
    let raw = match label {
        BrandLabel::Resolved(_) => return label.clone(),
        BrandLabel::Pending(raw) => raw.as_str(),
        BrandLabel::Unresolved => "",
    };
    let registry = normalizer.registry();

    // 1. Junk filter.
    if is_junk(raw) {
        return BrandLabel::Unresolved;
    }

    // 2. Re-normalize the current label with the link as extra context.
    if !raw.is_empty() {
        if let BrandLabel::Resolved(brand) = normalizer.normalize(raw, Some(link)) {
            return BrandLabel::Resolved(brand);
        }
    }

    // 3. Sanitize, then strict exact-alias lookup. Substring matching here
    // would compound the first pass's false positives.
    let cleaned = sanitize_label(raw);
    if cleaned.chars().count() > 2 {
        if let Some(brand) = registry.exact_alias(&cleaned) {
            return BrandLabel::Resolved(brand.to_string());
        }
    }

    // 4. Domain-based rescue from the destination link.
    if let Some(mapped) = brand_from_domain(link) {
        return match normalizer.normalize(mapped, None) {
            BrandLabel::Resolved(brand) => BrandLabel::Resolved(brand),
            _ => BrandLabel::Pending(mapped.to_string()),
        };
    }

    // 5. A raw label that is itself a canonical registry key survives;
    // everything else is declared unrecognizable.
    if registry.is_canonical(raw) {
        return BrandLabel::Resolved(raw.to_string());
    }
    BrandLabel::Unresolved
}

/// Labels that are data-URIs or long unspaced tokens carry no brand signal.
fn is_junk(raw: &str) -> bool {
    if raw.starts_with("data:image") {
        return true;
    }
    raw.chars().count() > MAX_UNSPACED_CHARS && !raw.contains(' ')
}

/// Strips technical tokens and file extensions, collapses separators.
#[must_use]
pub fn sanitize_label(raw: &str) -> String {
    let mut low = raw.to_lowercase();
    for token in SANITIZE_TOKENS {
        low = low.replace(token, " ");
    }
    low.replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Looks the link's host up in the hardcoded domain map.
#[must_use]
pub fn brand_from_domain(link: &str) -> Option<&'static str> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    DOMAIN_BRANDS
        .iter()
        .find(|(key, _)| host.contains(key))
        .map(|(_, brand)| *brand)
}

/// Stable fingerprint for an unresolved label, used to deduplicate the
/// review queue across runs.
#[must_use]
pub fn unknown_fingerprint(raw_label: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_label.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(link.as_bytes());
    format!("{:x}", hasher.finalize())
}
