use super::*;

fn whole(text: &str) -> Span {
    Span::new(0, text.len())
}

// ============================================================================
// find_section
// ============================================================================

#[test]
fn test_find_section_returns_offset_after_keyword() {
    let text = "  input:\n  val x\n";
    let offset = find_section(text, whole(text), "input").unwrap();
    assert_eq!(&text[offset..], "val x\n");
}

#[test]
fn test_find_section_is_relative_to_span() {
    let text = "output: a\n{ output: b }";
    let span = Span::new(11, text.len() - 1);
    let offset = find_section(text, span, "output").unwrap();
    assert_eq!(&text[offset..], "b }");
}

#[test]
fn test_find_section_missing() {
    let text = "  script:\n  echo";
    assert_eq!(find_section(text, whole(text), "input"), None);
}

#[test]
fn test_find_section_requires_colon() {
    let text = "  input val x";
    assert_eq!(find_section(text, whole(text), "input"), None);
}

// ============================================================================
// section_span
// ============================================================================

#[test]
fn test_section_span_stops_at_next_section() {
    let text = "\n  input:\n  val x\n  output:\n  path 'y'\n";
    let span = section_span(text, whole(text), SectionKind::Input).unwrap();
    assert_eq!(span.slice(text), "val x\n");
}

#[test]
fn test_section_span_runs_to_block_end() {
    let text = "\n  output:\n  path 'y'\n";
    let span = section_span(text, whole(text), SectionKind::Output).unwrap();
    assert_eq!(span.slice(text), "path 'y'\n");
    assert!(whole(text).contains(&span));
}

// ============================================================================
// extract_section_lines
// ============================================================================

#[test]
fn test_lines_are_trimmed_and_blank_lines_dropped() {
    let text = "  val x\n\n   \n  path y  \n";
    let lines: Vec<_> = extract_section_lines(text, whole(text), &[]).collect();
    assert_eq!(lines, vec!["val x", "path y"]);
}

#[test]
fn test_lines_stop_at_stop_keyword() {
    let text = "val x\noutput:\npath y\nscript:\necho";
    let stops = ["output:", "script:"];
    let lines: Vec<_> = extract_section_lines(text, whole(text), &stops).collect();
    assert_eq!(lines, vec!["val x"]);
}

#[test]
fn test_lines_never_include_stop_keywords() {
    let text = "a\nb\n  when:\nc\nmain:\nd";
    let stops = SectionKind::Input.stop_keywords();
    for line in extract_section_lines(text, whole(text), stops) {
        assert!(!stops.iter().any(|k| line.starts_with(k)));
        assert!(!line.is_empty());
    }
}

#[test]
fn test_lines_empty_span() {
    let text = "abc";
    assert_eq!(extract_section_lines(text, Span::new(1, 1), &[]).count(), 0);
}

// ============================================================================
// extract_named_channels
// ============================================================================

#[test]
fn test_named_channels_in_order() {
    let text = "path(x), emit: html\npath(y), emit: json";
    let channels = extract_named_channels(text, whole(text));
    assert_eq!(
        channels,
        vec![
            ChannelEntry::named("html", "path(x)"),
            ChannelEntry::named("json", "path(y)"),
        ]
    );
}

#[test]
fn test_named_channel_with_tuple() {
    let text = "tuple val(meta), path(\"*.html\"), emit: html\n";
    let channels = extract_named_channels(text, whole(text));
    assert_eq!(
        channels,
        vec![ChannelEntry::named("html", "tuple val(meta), path(\"*.html\")")]
    );
}

#[test]
fn test_named_channel_spanning_lines() {
    let text = "tuple val(meta),\n      path(\"*.zip\"), emit: zip\n";
    let channels = extract_named_channels(text, whole(text));
    assert_eq!(
        channels,
        vec![ChannelEntry::named("zip", "tuple val(meta),path(\"*.zip\")")]
    );
}

#[test]
fn test_named_channels_absent() {
    let text = "path 'y'\nval z\n";
    assert!(extract_named_channels(text, whole(text)).is_empty());
}

// ============================================================================
// extract_workflow_emits
// ============================================================================

#[test]
fn test_workflow_emits() {
    let text = "\n  reads = FASTP.out.reads\n  json  =  FASTP.out.json \n";
    let emits = extract_workflow_emits(text, whole(text));
    assert_eq!(
        emits,
        vec![
            ChannelEntry::named("reads", "FASTP.out.reads"),
            ChannelEntry::named("json", "FASTP.out.json"),
        ]
    );
}

#[test]
fn test_workflow_emits_bare_channels() {
    let text = "\n  ch_out\n";
    assert!(extract_workflow_emits(text, whole(text)).is_empty());
}

// ============================================================================
// SectionKind / ChannelEntry
// ============================================================================

#[test]
fn test_section_kind_block_keyword() {
    assert_eq!(SectionKind::Input.block_keyword(), BlockKeyword::Process);
    assert_eq!(SectionKind::Output.block_keyword(), BlockKeyword::Process);
    assert_eq!(SectionKind::Take.block_keyword(), BlockKeyword::Workflow);
    assert_eq!(SectionKind::Emit.block_keyword(), BlockKeyword::Workflow);
}

#[test]
fn test_channel_label() {
    assert_eq!(ChannelEntry::named("html", "x").label(3), "html");
    assert_eq!(ChannelEntry::positional("x").label(3), "3");
}
