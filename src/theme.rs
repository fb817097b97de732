use rand::seq::SliceRandom;

/// Theme tokens the random fallback may pick from. Only members of this list
/// ever reach the renderer; token names are never synthesized.
pub const PALETTE: &[&str] = &[
    "var(--ddd-theme-default-beaverBlue)",
    "var(--ddd-theme-default-pughBlue)",
    "var(--ddd-theme-default-skyBlue)",
    "var(--ddd-theme-default-creekTeal)",
    "var(--ddd-theme-default-forestGreen)",
    "var(--ddd-theme-default-opportunityGreen)",
    "var(--ddd-theme-default-keystoneYellow)",
    "var(--ddd-theme-default-inventOrange)",
    "var(--ddd-theme-default-discoveryCoral)",
    "var(--ddd-theme-default-wonderPurple)",
];

/// Hosts with a fixed brand color, matched against the domain itself and any
/// subdomain of it.
const DOMAIN_OVERRIDES: &[(&str, &str)] = &[("psu.edu", "var(--ddd-theme-default-nittanyNavy)")];

/// Derive the card accent color.
///
/// Priority: the color the page itself declares, then a known institutional
/// override for `host`, then a uniformly random palette entry. The random
/// pick is cosmetic and need not be reproducible. Always returns a non-empty
/// string.
pub fn resolve(explicit: Option<&str>, host: &str) -> String {
    if let Some(color) = explicit
        && !color.trim().is_empty()
    {
        return color.to_owned();
    }

    for (domain, token) in DOMAIN_OVERRIDES {
        if host == *domain || host.ends_with(&format!(".{domain}")) {
            return (*token).to_owned();
        }
    }

    PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PALETTE[0])
        .to_owned()
}
