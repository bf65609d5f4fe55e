//! Conversion file parsing and resolution tests.

use tab_convert::{ConvertError, LookupKind, parse_cnv};
use tab_model::Resolved;

/// Build a short-layout body line: 3 subtotal columns, 4 order columns, one
/// separator, 52 description columns, then the values.
fn line(subtotal: &str, order: u32, description: &str, values: &str) -> String {
    format!("{subtotal:>3}{order:>4} {description:<52}{values}")
}

/// Long-layout body line (`FORMAT == "N"`): 4 + 5 + 1 + 101 columns.
fn long_line(subtotal: &str, order: u32, description: &str, values: &str) -> String {
    format!("{subtotal:>4}{order:>5} {description:<101}{values}")
}

fn years_cnv() -> String {
    [
        "; Ano de internação".to_string(),
        "      3  2 F".to_string(),
        line("", 1, "2020", "20"),
        line("", 2, "2021", "21"),
        line("", 3, "Other", "99"),
    ]
    .join("\n")
}

#[test]
fn numeric_format_file_resolves_exact_values() {
    let cnv = parse_cnv("ANO.CNV", &years_cnv()).unwrap();

    assert_eq!(cnv.description(), Some("Ano de internação"));
    assert_eq!(cnv.declared_category_count(), 3);
    assert_eq!(cnv.value_length(), 2);
    assert_eq!(cnv.lookup_kind(), LookupKind::BinarySearch);
    assert_eq!(cnv.resolve("21"), Resolved::Label("2021".to_string()));
}

#[test]
fn header_comments_accumulate_and_colon_lines_are_skipped() {
    let text = [
        "; First line".to_string(),
        ": skipped".to_string(),
        "; Second line".to_string(),
        "      1  2".to_string(),
        line("", 1, "Only", "01"),
    ]
    .join("\n");

    let cnv = parse_cnv("X.CNV", &text).unwrap();
    assert_eq!(cnv.description(), Some("First line\nSecond line"));
}

#[test]
fn stay_length_ranges_are_inclusive_on_both_bounds() {
    let text = [
        "      4  4".to_string(),
        line("", 1, "1-7 dias", "0001-0007"),
        line("", 2, "8-14 dias", "0008-0014"),
        line("", 3, "15-28 dias", "0015-0028"),
        line("", 4, "29 dias e +", "0029-9999"),
    ]
    .join("\n");

    let cnv = parse_cnv("PERM.CNV", &text).unwrap();
    assert_eq!(cnv.lookup_kind(), LookupKind::Range);

    let label = |v: &str| cnv.resolve(v);
    assert_eq!(label("0008"), Resolved::Label("8-14 dias".to_string()));
    assert_eq!(label("0009"), Resolved::Label("8-14 dias".to_string()));
    assert_eq!(label("0014"), Resolved::Label("8-14 dias".to_string()));
    assert_eq!(label("0029"), Resolved::Label("29 dias e +".to_string()));
    assert_eq!(label("0050"), Resolved::Label("29 dias e +".to_string()));
    assert_eq!(label("0000"), Resolved::NoMatch);
}

#[test]
fn overlapping_ranges_resolve_to_the_lowest_declared_order() {
    let text = [
        "      2  4".to_string(),
        line("", 1, "8-14 dias", "0008-0014"),
        line("", 2, "Todos", "0000-9999"),
    ]
    .join("\n");

    let cnv = parse_cnv("OVERLAP.CNV", &text).unwrap();
    assert_eq!(cnv.resolve("0009"), Resolved::Label("8-14 dias".to_string()));
    assert_eq!(cnv.resolve("0500"), Resolved::Label("Todos".to_string()));
}

#[test]
fn alphanumeric_code_ranges_match_lexicographically() {
    let text = [
        "      2  4 L".to_string(),
        line("", 1, "K01   Dentes inclusos e impactados", "K010-K019"),
        line("", 2, "K02   Cárie dentária", "K020-K029"),
    ]
    .join("\n");

    let cnv = parse_cnv("CID.CNV", &text).unwrap();
    // Ranges force the interval structure even for a type-L file.
    assert_eq!(cnv.lookup_kind(), LookupKind::Range);

    let dentes = Resolved::Label("K01   Dentes inclusos e impactados".to_string());
    assert_eq!(cnv.resolve("K011"), dentes);
    assert_eq!(cnv.resolve("K012"), dentes);
    assert_eq!(cnv.resolve("K019"), dentes);
    assert_eq!(cnv.resolve("ABCD"), Resolved::NoMatch);
}

#[test]
fn blank_values_designate_the_empty_category() {
    let text = [
        "      2  2".to_string(),
        line("", 1, "Ign/Branco", ",99"),
        line("", 2, "Positivo", "01"),
    ]
    .join("\n");

    let cnv = parse_cnv("RESULT.CNV", &text).unwrap();
    let empty = cnv.empty_category().expect("empty category designated");
    assert_eq!(empty.description, "Ign/Branco");

    assert_eq!(cnv.resolve(""), Resolved::Label("Ign/Branco".to_string()));
    assert_eq!(cnv.resolve("  "), Resolved::Label("Ign/Branco".to_string()));
    assert_eq!(cnv.resolve("99"), Resolved::Label("Ign/Branco".to_string()));
    assert_eq!(cnv.resolve("01"), Resolved::Label("Positivo".to_string()));
}

#[test]
fn blank_input_without_empty_category_is_no_match() {
    let cnv = parse_cnv("ANO.CNV", &years_cnv()).unwrap();
    assert_eq!(cnv.resolve(""), Resolved::NoMatch);
    assert_eq!(cnv.resolve("   "), Resolved::NoMatch);
}

#[test]
fn subtotal_categories_leave_the_resolvable_set() {
    let text = [
        "      3  2".to_string(),
        line("", 1, "Norte", "11"),
        line("", 2, "Sul", "41"),
        line("1", 3, "Total", "11,41"),
    ]
    .join("\n");

    let cnv = parse_cnv("REGIAO.CNV", &text).unwrap();
    assert_eq!(cnv.categories().len(), 2);
    assert_eq!(cnv.subtotal_categories().len(), 1);
    assert_eq!(
        cnv.declared_category_count(),
        cnv.categories().len() + cnv.subtotal_categories().len()
    );
    assert_eq!(cnv.resolve("11"), Resolved::Label("Norte".to_string()));
}

#[test]
fn continuation_lines_append_values_to_the_same_order() {
    let text = [
        "      2  2".to_string(),
        line("", 1, "Alta", "11"),
        line("", 1, "Alta", "14,15"),
        line("", 2, "Óbito", "41"),
    ]
    .join("\n");

    let cnv = parse_cnv("SAIDA.CNV", &text).unwrap();
    assert_eq!(cnv.categories().len(), 2);

    let alta = Resolved::Label("Alta".to_string());
    assert_eq!(cnv.resolve("11"), alta);
    assert_eq!(cnv.resolve("14"), alta);
    assert_eq!(cnv.resolve("15"), alta);
    assert_eq!(cnv.resolve("41"), Resolved::Label("Óbito".to_string()));
}

#[test]
fn duplicate_keys_resolve_to_the_last_declaration() {
    // Two categories declaring the same key: the hash index keeps the last
    // writer, matching the behavior of the legacy tabulator.
    let text = [
        "      2  2 L".to_string(),
        line("", 1, "Alta do paciente", "43"),
        line("", 2, "Alta mãe/alta RN", "43"),
    ]
    .join("\n");

    let cnv = parse_cnv("SAIDAPERM.CNV", &text).unwrap();
    assert_eq!(cnv.lookup_kind(), LookupKind::Hash);
    assert_eq!(
        cnv.resolve("43"),
        Resolved::Label("Alta mãe/alta RN".to_string())
    );
}

#[test]
fn long_format_uses_wide_columns() {
    let text = [
        "N     2  4".to_string(),
        long_line("", 1, "Procedimentos com finalidade diagnóstica", "0201"),
        long_line("", 2, "Ações de promoção e prevenção em saúde", "0101"),
    ]
    .join("\n");

    let cnv = parse_cnv("GRUPO.CNV", &text).unwrap();
    assert_eq!(
        cnv.resolve("0201"),
        Resolved::Label("Procedimentos com finalidade diagnóstica".to_string())
    );
}

#[test]
fn inline_comments_and_eof_marker_are_stripped() {
    let text = [
        "      1  2 ; header comment".to_string(),
        format!("{}; trailing comment", line("", 1, "Only", "01,02")),
        "\u{1a}".to_string(),
    ]
    .join("\n");

    let cnv = parse_cnv("X.CNV", &text).unwrap();
    assert_eq!(cnv.resolve("02"), Resolved::Label("Only".to_string()));
}

#[test]
fn missing_category_slot_is_tolerated() {
    let text = [
        "      3  2".to_string(),
        line("", 1, "One", "01"),
        line("", 3, "Three", "03"),
    ]
    .join("\n");

    // Declared count 3 but order 2 never appears: logged, not fatal.
    let cnv = parse_cnv("GAP.CNV", &text).unwrap();
    assert_eq!(cnv.declared_category_count(), 3);
    assert_eq!(cnv.categories().len(), 2);
    assert_eq!(cnv.resolve("03"), Resolved::Label("Three".to_string()));
}

#[test]
fn malformed_header_is_fatal_with_line_number() {
    let err = parse_cnv("BAD.CNV", "; comment\nnot a header\n").unwrap_err();
    match err {
        ConvertError::MalformedHeader { line, content } => {
            assert_eq!(line, 2);
            assert_eq!(content, "not a header");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_body_line_is_fatal_with_line_number() {
    let text = ["      1  2".to_string(), "too short".to_string()].join("\n");
    let err = parse_cnv("BAD.CNV", &text).unwrap_err();
    match err {
        ConvertError::MalformedBodyLine { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn order_outside_the_declared_count_is_fatal() {
    let text = ["      1  2".to_string(), line("", 5, "Stray", "01")].join("\n");
    assert!(matches!(
        parse_cnv("BAD.CNV", &text),
        Err(ConvertError::MalformedBodyLine { .. })
    ));
}

#[test]
fn reparsing_the_same_text_is_structurally_equal() {
    let text = years_cnv();
    let first = parse_cnv("ANO.CNV", &text).unwrap();
    let second = parse_cnv("ANO.CNV", &text).unwrap();

    assert_eq!(first.name(), second.name());
    assert_eq!(first.description(), second.description());
    assert_eq!(first.declared_category_count(), second.declared_category_count());
    assert_eq!(first.value_length(), second.value_length());
    assert_eq!(first.categories(), second.categories());
    assert_eq!(first.lookup_kind(), second.lookup_kind());
}
