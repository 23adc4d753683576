//! Integration tests for the export entry points.

mod common;

use common::{approx, build_pdf, letter_pdf, read_pages, PageSpec};
use notepdf::{
    export_document, export_document_with_options, export_file, generate_preview,
    inspect_document, preview_file, AssembleOptions, Color, FillSpec, MarginConfig, MarginSide,
    NotePdf, PatternKind, Rotation, SideSet, PREVIEW_PAGE_LIMIT,
};

#[test]
fn test_preview_is_bounded() {
    let data = letter_pdf(5);
    let config = MarginConfig::side(MarginSide::Right, 25.0);
    let preview = generate_preview(&data, &config, &FillSpec::default()).unwrap();

    assert_eq!(preview.total_page_count, 5);

    let original = read_pages(&preview.original);
    let transformed = read_pages(&preview.transformed);
    assert_eq!(original.len(), PREVIEW_PAGE_LIMIT);
    assert_eq!(transformed.len(), PREVIEW_PAGE_LIMIT);

    for (i, (before, after)) in original.iter().zip(&transformed).enumerate() {
        assert!(approx(before.width(), 612.0));
        assert!(approx(after.width(), 765.0));
        assert!(before.margin_rects().is_empty());
        assert_eq!(after.margin_rects().len(), 1);
        let marker = format!("(page {})", i + 1);
        assert!(before.form_text().contains(&marker));
        assert!(after.form_text().contains(&marker));
    }
}

#[test]
fn test_preview_of_short_document() {
    let data = letter_pdf(2);
    let preview =
        generate_preview(&data, &MarginConfig::default(), &FillSpec::default()).unwrap();
    assert_eq!(preview.total_page_count, 2);
    assert_eq!(read_pages(&preview.original).len(), 2);
    assert_eq!(read_pages(&preview.transformed).len(), 2);
}

#[test]
fn test_preview_rejects_invalid_config() {
    let data = letter_pdf(2);
    let config = MarginConfig::new(SideSet::empty(), 10.0);
    let result = generate_preview(&data, &config, &FillSpec::default());
    assert!(matches!(result, Err(notepdf::Error::InvalidMargin(_))));
}

#[test]
fn test_export_processes_every_page() {
    let data = letter_pdf(7);
    let config = MarginConfig::per_axis(
        SideSet::only(MarginSide::Right).with(MarginSide::Bottom),
        20.0,
        10.0,
    );
    let fill = FillSpec::pattern(PatternKind::Lines, 18.0, Color::RULE_GRAY);
    let bytes = export_document(&data, &config, &fill).unwrap();

    let pages = read_pages(&bytes);
    assert_eq!(pages.len(), 7);
    for (i, page) in pages.iter().enumerate() {
        assert!(approx(page.width(), 612.0 + 122.4));
        assert!(approx(page.height(), 792.0 + 79.2));
        let (dx, dy) = page.translation();
        assert!(approx(dx, 0.0) && approx(dy, 79.2));
        assert!(page.form_text().contains(&format!("(page {})", i + 1)));
    }
}

#[test]
fn test_export_reports_skipped_pages() {
    let data = build_pdf(&[PageSpec::letter().rotated(33), PageSpec::letter()]);
    let assembly = export_document_with_options(
        &data,
        &MarginConfig::default(),
        &FillSpec::default(),
        &AssembleOptions::new().skip_bad_pages(),
    )
    .unwrap();
    assert_eq!(assembly.pages_written, 1);
    assert_eq!(assembly.skipped[0].0, 0);
}

#[test]
fn test_inspect_document() {
    let data = build_pdf(&[PageSpec::letter(), PageSpec::new(842.0, 595.0).rotated(90)]);
    let info = inspect_document(&data).unwrap();
    assert_eq!(info.version, "1.7");
    assert_eq!(info.page_count, 2);
    assert!(approx(info.pages[1].width, 842.0));
    assert_eq!(info.pages[1].rotation, Rotation::Deg90);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["page_count"], 2);
}

#[test]
fn test_builder_matches_free_functions() {
    let data = letter_pdf(3);
    let via_builder = NotePdf::new()
        .sides([MarginSide::Left, MarginSide::Top])
        .width(10.0)
        .pattern(PatternKind::Dots, 14.4, Color::RULE_GRAY)
        .export(&data)
        .unwrap();

    let config = MarginConfig::new(SideSet::only(MarginSide::Left).with(MarginSide::Top), 10.0);
    let fill = FillSpec::pattern(PatternKind::Dots, 14.4, Color::RULE_GRAY);
    let direct = export_document(&data, &config, &fill).unwrap();
    assert_eq!(via_builder, direct);

    let preview = NotePdf::new().preview(&data).unwrap();
    assert_eq!(preview.total_page_count, 3);
}

#[test]
fn test_file_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("slides.pdf");
    let output = dir.path().join("slides_notes.pdf");
    std::fs::write(&input, letter_pdf(4)).unwrap();

    export_file(&input, &output, &MarginConfig::default(), &FillSpec::default()).unwrap();
    let written = std::fs::read(&output).unwrap();
    assert_eq!(read_pages(&written).len(), 4);

    let preview = preview_file(&input, &MarginConfig::default(), &FillSpec::default()).unwrap();
    assert_eq!(preview.total_page_count, 4);
}

#[test]
fn test_concurrent_exports_are_independent() {
    let data = letter_pdf(3);
    let config = MarginConfig::default();
    let expected = export_document(&data, &config, &FillSpec::default()).unwrap();

    let results: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| export_document(&data, &config, &FillSpec::default()).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for bytes in results {
        assert_eq!(bytes, expected);
    }
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_async_export() {
    let data = letter_pdf(2);
    let bytes = notepdf::export_document_async(data, MarginConfig::default(), FillSpec::default())
        .await
        .unwrap();
    assert_eq!(read_pages(&bytes).len(), 2);

    let preview =
        notepdf::generate_preview_async(letter_pdf(5), MarginConfig::default(), FillSpec::default())
            .await
            .unwrap();
    assert_eq!(preview.total_page_count, 5);
}
