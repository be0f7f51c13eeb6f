//! Commitment code classification.
//!
//! A commitment code ("empenho") looks like `2011000045/2026`; its first four
//! characters identify the issuing department ("secretaria"). The lookup table
//! is static and append-only: onboarding a department means adding one row.

use serde::Serialize;

/// A municipal department that issues commitment codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrganizationalUnit {
    /// Four-character key matched against the start of a commitment code
    pub code4: &'static str,
    /// Short display code (e.g. "SME")
    pub abbreviation: &'static str,
    /// Full display name
    pub name: &'static str,
}

const fn unit(
    code4: &'static str,
    abbreviation: &'static str,
    name: &'static str,
) -> OrganizationalUnit {
    OrganizationalUnit {
        code4,
        abbreviation,
        name,
    }
}

/// Known departments, keyed by the first four digits of their commitment codes.
pub static UNITS: [OrganizationalUnit; 20] = [
    unit("2001", "SEGOV", "Secretaria Municipal de Governo"),
    unit("2002", "PGM/PROCON", "Procuradoria Geral do Município / PROCON"),
    unit("2004", "SMR", "Secretaria Municipal da Receita"),
    unit("2006", "SMTT", "Secretaria Municipal de Trânsito e Transporte"),
    unit("2009", "SMDE", "Secretaria Municipal de Desenvolvimento Econômico"),
    unit("2010", "SMPAS", "Secretaria Municipal de Promoção e Assistência Social"),
    unit("2011", "SME", "Secretaria Municipal de Educação"),
    unit("2013", "SMPAS", "Secretaria Municipal de Promoção e Assistência Social"),
    unit("2014", "SMS", "Secretaria Municipal de Saúde"),
    unit("2015", "SMA", "Secretaria Municipal de Administração"),
    unit("2016", "SMEL", "Secretaria Municipal de Esporte e Lazer"),
    unit("2017", "SMINFRA", "Secretaria Municipal de Infraestrutura"),
    unit("2018", "SMAGRI", "Secretaria Municipal de Agricultura"),
    unit("2019", "SMMA", "Secretaria Municipal de Meio Ambiente"),
    unit("2021", "GASP", "Gabinete de Ações Estratégicas e Planejamento"),
    unit("2022", "SMHU", "Secretaria Municipal de Habitação e Urbanismo"),
    unit("2023", "SMC", "Secretaria Municipal de Cultura"),
    unit("2024", "SMGP", "Secretaria Municipal de Gestão de Pessoas"),
    unit("2025", "GCS", "Gabinete de Comunicação Social"),
    unit("2026", "SMCT", "Secretaria Municipal de Ciência e Tecnologia"),
];

/// Number of leading characters that identify a department.
pub const UNIT_PREFIX_LEN: usize = 4;

/// Resolves the department that issued a commitment code.
///
/// Returns `None` when the code has fewer than four characters or when its
/// four-character prefix is not in [`UNITS`]. The prefix is compared verbatim,
/// so callers are expected to store codes through
/// [`normalize_commitment_code`].
#[must_use]
pub fn resolve_unit(code: &str) -> Option<&'static OrganizationalUnit> {
    let prefix_end = code.char_indices().nth(UNIT_PREFIX_LEN - 1)?;
    let prefix = &code[..prefix_end.0 + prefix_end.1.len_utf8()];
    unit_by_code(prefix)
}

/// Looks up a department by its exact four-character key.
#[must_use]
pub fn unit_by_code(code4: &str) -> Option<&'static OrganizationalUnit> {
    UNITS.iter().find(|u| u.code4 == code4)
}

/// Looks up the first department carrying the given abbreviation.
#[must_use]
pub fn unit_by_abbreviation(abbreviation: &str) -> Option<&'static OrganizationalUnit> {
    UNITS.iter().find(|u| u.abbreviation == abbreviation)
}

/// Trims and uppercases a user-typed commitment code. Blank input is `None`.
#[must_use]
pub fn normalize_commitment_code(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Feedback for a commitment code while it is being typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeDetection {
    /// Too short to classify yet
    Empty,
    /// Prefix matches a known department
    Recognized(&'static OrganizationalUnit),
    /// Long enough to classify but the prefix is unknown; still a valid code
    Unrecognized,
}

/// Classifies a partially or fully typed code for entry feedback.
#[must_use]
pub fn detect(code: &str) -> CodeDetection {
    if code.chars().count() < UNIT_PREFIX_LEN {
        return CodeDetection::Empty;
    }
    resolve_unit(code).map_or(CodeDetection::Unrecognized, CodeDetection::Recognized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_known_code() {
        let unit = resolve_unit("2011000045/2026").unwrap();
        assert_eq!(unit.abbreviation, "SME");
        assert_eq!(unit.name, "Secretaria Municipal de Educação");
    }

    #[test]
    fn test_resolve_unknown_prefix() {
        assert_eq!(resolve_unit("9999000045/2026"), None);
    }

    #[test]
    fn test_short_codes_are_not_found() {
        for code in ["", "2", "20", "201"] {
            assert_eq!(resolve_unit(code), None, "code {code:?}");
        }
    }

    #[test]
    fn test_every_prefix_resolves_with_any_suffix() {
        for u in &UNITS {
            for suffix in ["", "000001/2025", "x", "/"] {
                let code = format!("{}{suffix}", u.code4);
                assert_eq!(resolve_unit(&code), Some(u), "code {code:?}");
            }
        }
    }

    #[test]
    fn test_table_keys_are_unique_four_digit_codes() {
        let keys: HashSet<_> = UNITS.iter().map(|u| u.code4).collect();
        assert_eq!(keys.len(), UNITS.len());
        assert!(
            UNITS
                .iter()
                .all(|u| u.code4.len() == 4 && u.code4.chars().all(|c| c.is_ascii_digit()))
        );
    }

    #[test]
    fn test_shared_abbreviation_across_codes() {
        assert_eq!(resolve_unit("2010").unwrap().abbreviation, "SMPAS");
        assert_eq!(resolve_unit("2013").unwrap().abbreviation, "SMPAS");
        assert_eq!(unit_by_abbreviation("SMPAS").unwrap().code4, "2010");
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert_eq!(resolve_unit("çç"), None);
        assert_eq!(resolve_unit("éééé/2026"), None);
    }

    #[test]
    fn test_normalize_commitment_code() {
        assert_eq!(
            normalize_commitment_code("  2001000037/2026 "),
            Some("2001000037/2026".to_string())
        );
        assert_eq!(normalize_commitment_code("ab12"), Some("AB12".to_string()));
        assert_eq!(normalize_commitment_code("   "), None);
    }

    #[test]
    fn test_detect_states() {
        assert_eq!(detect("201"), CodeDetection::Empty);
        assert_eq!(detect("9999"), CodeDetection::Unrecognized);
        match detect("2014000001/2026") {
            CodeDetection::Recognized(u) => assert_eq!(u.abbreviation, "SMS"),
            other => panic!("unexpected detection {other:?}"),
        }
    }
}
