//! Canonicalization of free-form preference tokens before any matching.
//!
//! Pure and deterministic: no network, no storage. Every preference field
//! passes through here before it is used to build a filter or a log entry.

/// Which preference field a raw token belongs to. Alias tables differ per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Role,
    Location,
    Experience,
    Salary,
}

const ROLE_ALIASES: &[(&str, &str)] = &[
    ("it audit", "technology audit"),
    ("tech audit", "technology audit"),
    ("information technology audit", "technology audit"),
    ("audit lead", "audit manager"),
    ("audit team manager", "audit manager"),
    ("auditing manager", "audit manager"),
];

const LOCATION_ALIASES: &[(&str, &str)] = &[
    ("ny", "new york"),
    ("nyc", "new york"),
    ("new york city", "new york"),
    ("ma", "boston"),
    ("massachusetts", "boston"),
    ("la", "los angeles"),
];

const EXPERIENCE_ALIASES: &[(&str, &str)] = &[
    ("management", "manager"),
    ("managerial", "manager"),
    ("manager level", "manager"),
    ("team lead", "manager"),
    ("senior level", "senior"),
    ("experienced", "senior"),
    ("advanced", "senior"),
    ("entry level", "junior"),
    ("entry-level", "junior"),
    ("graduate", "junior"),
];

/// Maps a raw field value onto its canonical form: lower-cased, trimmed,
/// inner whitespace collapsed, then resolved through the field's alias table.
/// Unknown values pass through otherwise unchanged.
///
/// Idempotent: no canonical form appears as an alias key, so
/// `normalize(kind, &normalize(kind, x)) == normalize(kind, x)`.
pub fn normalize(kind: FieldKind, raw: &str) -> String {
    let canonical = raw
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let aliases: &[(&str, &str)] = match kind {
        FieldKind::Role => ROLE_ALIASES,
        FieldKind::Location => LOCATION_ALIASES,
        FieldKind::Experience => EXPERIENCE_ALIASES,
        FieldKind::Salary => &[],
    };

    aliases
        .iter()
        .find(|(alias, _)| *alias == canonical)
        .map(|(_, target)| (*target).to_string())
        .unwrap_or(canonical)
}
