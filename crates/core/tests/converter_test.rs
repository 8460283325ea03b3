//! Tests for the layout analyzer, the page aggregator and the text converter.

use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use quire_core::converter::{PDFLayoutAnalyzer, PDFPageAggregator, TextConverter};
use quire_core::document::PDFPage;
use quire_core::error::{PdfError, Result};
use quire_core::font::PDFFont;
use quire_core::image::{ImageDescriber, PlaceholderDescriber};
use quire_core::interp::{PDFDevice, PDFPageInterpreter, PDFResourceManager, PathSegment};
use quire_core::layout::{
    LAParams, LTChar, LTImage, LTItem, LTPage, LTRect, LTTextBox, LTTextLine, PathStyle,
    WritingMode,
};
use quire_core::model::{PDFColorSpace, PDFGraphicState};
use quire_core::utils::{HasBBox, MATRIX_IDENTITY, Matrix};

fn m(x: f64, y: f64) -> PathSegment {
    PathSegment::MoveTo(x, y)
}

fn l(x: f64, y: f64) -> PathSegment {
    PathSegment::LineTo(x, y)
}

const H: PathSegment = PathSegment::ClosePath;

fn open_analyzer(ctm: Matrix) -> PDFLayoutAnalyzer {
    let mut analyzer = PDFLayoutAnalyzer::new(None, 1);
    analyzer.begin_page((0.0, 0.0, 1000.0, 1000.0), MATRIX_IDENTITY);
    analyzer.set_ctm(ctm);
    analyzer
}

fn paint_with(ctm: Matrix, gstate: &PDFGraphicState, path: &[PathSegment]) -> Vec<LTItem> {
    let mut analyzer = open_analyzer(ctm);
    analyzer
        .paint_path(gstate, true, false, false, path)
        .unwrap();
    analyzer.end_page().unwrap().items().to_vec()
}

fn paint(path: &[PathSegment]) -> Vec<LTItem> {
    paint_with(MATRIX_IDENTITY, &PDFGraphicState::default(), path)
}

fn kinds(items: &[LTItem]) -> Vec<&'static str> {
    items
        .iter()
        .map(|item| match item {
            LTItem::Line(_) => "line",
            LTItem::Rect(_) => "rect",
            LTItem::Curve(_) => "curve",
            LTItem::Char(_) => "char",
            LTItem::Figure(_) => "figure",
            LTItem::Image(_) => "image",
            _ => "other",
        })
        .collect()
}

// ============================================================================
// Path classification
// ============================================================================

mod paint_path_tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        assert_eq!(kinds(&paint(&[m(6.0, 7.0), l(7.0, 7.0)])), vec!["line"]);
    }

    #[test]
    fn test_standard_rect() {
        let items = paint(&[m(10.0, 90.0), l(90.0, 90.0), l(90.0, 10.0), l(10.0, 10.0), H]);
        assert_eq!(kinds(&items), vec!["rect"]);
        assert_eq!(items[0].bbox(), (10.0, 10.0, 90.0, 90.0));
    }

    #[test]
    fn test_mllll_variation_is_rect() {
        let items = paint(&[
            m(10.0, 90.0),
            l(90.0, 90.0),
            l(90.0, 10.0),
            l(10.0, 10.0),
            l(10.0, 90.0),
        ]);
        assert_eq!(kinds(&items), vec!["rect"]);
    }

    #[test]
    fn test_mllll_open_is_curve() {
        let items = paint(&[
            m(10.0, 90.0),
            l(90.0, 90.0),
            l(90.0, 10.0),
            l(10.0, 10.0),
            l(10.0, 80.0),
        ]);
        assert_eq!(kinds(&items), vec!["curve"]);
    }

    #[test]
    fn test_bowtie_is_curve() {
        let items = paint(&[m(110.0, 90.0), l(190.0, 10.0), l(190.0, 90.0), l(110.0, 10.0), H]);
        assert_eq!(kinds(&items), vec!["curve"]);
    }

    #[test]
    fn test_slanted_quadrilateral_is_curve() {
        let items = paint(&[m(210.0, 90.0), l(290.0, 60.0), l(290.0, 10.0), l(210.0, 10.0), H]);
        assert_eq!(kinds(&items), vec!["curve"]);
        let LTItem::Curve(curve) = &items[0] else {
            unreachable!()
        };
        assert_eq!(curve.pts.len(), 5);
    }

    #[test]
    fn test_multiple_subpaths_classified_independently() {
        let items = paint(&[
            m(6.0, 7.0),
            l(7.0, 7.0),
            l(7.0, 91.0),
            l(6.0, 91.0),
            H,
            m(4.0, 7.0),
            l(6.0, 7.0),
            l(6.0, 91.0),
            l(4.0, 91.0),
            H,
            m(67.0, 2.0),
            l(68.0, 2.0),
            l(68.0, 3.0),
            l(67.0, 3.0),
            H,
        ]);
        assert_eq!(kinds(&items), vec!["rect", "rect", "rect"]);
    }

    #[test]
    fn test_line_and_rect_in_one_paint() {
        let items = paint(&[
            m(0.0, 0.0),
            l(50.0, 0.0),
            m(310.0, 90.0),
            l(350.0, 90.0),
            l(350.0, 10.0),
            l(310.0, 10.0),
            H,
        ]);
        assert_eq!(kinds(&items), vec!["line", "rect"]);
    }

    #[test]
    fn test_simple_lines_closed_and_open() {
        let closed = paint(&[
            m(10.0, 30.0),
            l(10.0, 40.0),
            H,
            m(10.0, 50.0),
            l(70.0, 50.0),
            H,
            m(10.0, 10.0),
            l(30.0, 30.0),
            H,
        ]);
        assert_eq!(kinds(&closed), vec!["line", "line", "line"]);
        let open = paint(&[
            m(10.0, 30.0),
            l(10.0, 40.0),
            m(10.0, 50.0),
            l(70.0, 50.0),
            m(10.0, 10.0),
            l(30.0, 30.0),
        ]);
        assert_eq!(kinds(&open), vec!["line", "line", "line"]);
        let LTItem::Line(line) = &open[2] else {
            unreachable!()
        };
        assert_eq!(line.pts(), &[(10.0, 10.0), (30.0, 30.0)]);
    }

    #[test]
    fn test_bezier_keeps_end_points() {
        for seg in [
            PathSegment::CurveTo(72.41, 434.45, 71.96, 434.89, 71.41, 434.89),
            PathSegment::CurveV(71.96, 434.89, 71.41, 434.89),
            PathSegment::CurveY(72.41, 434.45, 71.41, 434.89),
        ] {
            let items = paint(&[m(72.41, 433.89), seg]);
            let LTItem::Curve(curve) = &items[0] else {
                panic!("expected a curve for {seg:?}");
            };
            assert_eq!(curve.pts, vec![(72.41, 433.89), (71.41, 434.89)]);
        }
    }

    #[test]
    fn test_redundant_lineto_normalized() {
        let with_extra = paint(&[m(0.0, 0.0), l(10.0, 0.0), l(10.0, 10.0), l(0.0, 0.0), H]);
        let without = paint(&[m(0.0, 0.0), l(10.0, 0.0), l(10.0, 10.0), H]);
        let (LTItem::Curve(a), LTItem::Curve(b)) = (&with_extra[0], &without[0]) else {
            panic!("expected curves");
        };
        assert_eq!(a.pts, b.pts);
    }

    #[test]
    fn test_redundant_lineto_rect() {
        let items = paint(&[
            m(0.0, 0.0),
            l(10.0, 0.0),
            l(10.0, 5.0),
            l(0.0, 5.0),
            l(0.0, 0.0),
            H,
        ]);
        assert_eq!(kinds(&items), vec!["rect"]);
    }

    #[test]
    fn test_single_moveto_is_point_curve() {
        let items = paint(&[m(12.0, 34.0)]);
        assert_eq!(kinds(&items), vec!["curve"]);
        let LTItem::Curve(curve) = &items[0] else {
            unreachable!()
        };
        assert_eq!(curve.pts, vec![(12.0, 34.0)]);
        assert_eq!(items[0].bbox(), (12.0, 34.0, 12.0, 34.0));

        let items = paint(&[m(0.0, 0.0), m(6.0, 7.0), l(7.0, 7.0)]);
        assert_eq!(kinds(&items), vec!["line"]);
    }

    #[test]
    fn test_without_starting_moveto_dropped() {
        assert!(paint(&[H]).is_empty());
        assert!(paint(&[l(72.41, 433.89), l(82.41, 433.89), H]).is_empty());
        assert!(paint(&[]).is_empty());
    }

    #[test]
    fn test_rect_test_uses_device_space() {
        let rect = [m(10.0, 10.0), l(50.0, 10.0), l(50.0, 30.0), l(10.0, 30.0), H];
        let quarter_turn = (0.0, 1.0, -1.0, 0.0, 100.0, 0.0);
        let items = paint_with(quarter_turn, &PDFGraphicState::default(), &rect);
        assert_eq!(kinds(&items), vec!["rect"]);
        assert_eq!(items[0].bbox(), (70.0, 10.0, 90.0, 50.0));

        let c = std::f64::consts::FRAC_1_SQRT_2;
        let eighth_turn = (c, c, -c, c, 0.0, 0.0);
        let items = paint_with(eighth_turn, &PDFGraphicState::default(), &rect);
        assert_eq!(kinds(&items), vec!["curve"]);
    }

    #[test]
    fn test_original_path_kept_untransformed() {
        let path = [m(1.0, 2.0), l(3.0, 2.0)];
        let items = paint_with((2.0, 0.0, 0.0, 2.0, 5.0, 5.0), &PDFGraphicState::default(), &path);
        let LTItem::Line(line) = &items[0] else {
            unreachable!()
        };
        assert_eq!(line.pts(), &[(7.0, 9.0), (11.0, 9.0)]);
        assert_eq!(line.original_path(), &path);
    }

    #[test]
    fn test_style_from_graphics_state() {
        let mut gstate = PDFGraphicState::default();
        gstate.linewidth = 2.5;
        gstate.dash = Some((vec![1.0, 1.0], 0.0));
        let items = paint_with(MATRIX_IDENTITY, &gstate, &[m(0.0, 0.0), l(5.0, 0.0)]);
        let LTItem::Line(line) = &items[0] else {
            unreachable!()
        };
        let style: &PathStyle = line.style();
        assert_eq!(style.linewidth, 2.5);
        assert!(style.stroke);
        assert_eq!(style.dashing_style, Some((vec![1.0, 1.0], 0.0)));
    }

    #[test]
    fn test_paths_can_be_switched_off() {
        let mut analyzer = PDFLayoutAnalyzer::new(None, 1).record_paths(false);
        analyzer.begin_page((0.0, 0.0, 100.0, 100.0), MATRIX_IDENTITY);
        analyzer
            .paint_path(&PDFGraphicState::default(), true, false, false, &[m(0.0, 0.0), l(1.0, 1.0)])
            .unwrap();
        assert!(analyzer.end_page().unwrap().items().is_empty());
    }

    #[test]
    fn test_paint_without_page_is_error() {
        let mut analyzer = PDFLayoutAnalyzer::new(None, 1);
        let err = analyzer
            .paint_path(&PDFGraphicState::default(), true, false, false, &[m(0.0, 0.0), l(1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, PdfError::NoActiveContainer(_)));
    }
}

// ============================================================================
// Figures and images
// ============================================================================

mod figure_tests {
    use super::*;

    fn image_stream() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 3,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceRGB",
            },
            vec![0u8; 18],
        )
    }

    #[test]
    fn test_nested_figures() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        analyzer
            .begin_figure("F1", (0.0, 0.0, 100.0, 100.0), (1.0, 0.0, 0.0, 1.0, 10.0, 20.0))
            .unwrap();
        analyzer
            .begin_figure("F2", (0.0, 0.0, 10.0, 10.0), MATRIX_IDENTITY)
            .unwrap();
        assert_eq!(analyzer.figure_depth(), 2);
        analyzer.end_figure("F2").unwrap();
        analyzer.end_figure("F1").unwrap();
        let page = analyzer.end_page().unwrap();

        assert_eq!(page.items().len(), 1);
        let LTItem::Figure(outer) = &page.items()[0] else {
            panic!("expected a figure");
        };
        assert_eq!(outer.name(), "F1");
        assert_eq!(outer.bbox(), (10.0, 20.0, 110.0, 120.0));
        assert_eq!(kinds(outer.items()), vec!["figure"]);
    }

    #[test]
    fn test_unbalanced_figure_is_page_error() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        analyzer
            .begin_figure("F1", (0.0, 0.0, 1.0, 1.0), MATRIX_IDENTITY)
            .unwrap();
        let err = analyzer.end_page().unwrap_err();
        assert!(matches!(err, PdfError::UnbalancedFigure { pageid: 1, open: 1 }));
    }

    #[test]
    fn test_end_figure_on_empty_stack() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        assert!(matches!(
            analyzer.end_figure("X"),
            Err(PdfError::UnmatchedEndFigure(_))
        ));
        // The page itself is still usable.
        assert!(analyzer.end_page().is_ok());
    }

    #[test]
    fn test_image_spans_figure() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        analyzer
            .begin_figure("Im1", (0.0, 0.0, 1.0, 1.0), (100.0, 0.0, 0.0, 50.0, 10.0, 20.0))
            .unwrap();
        analyzer.render_image("Im1", &image_stream()).unwrap();
        analyzer.end_figure("Im1").unwrap();
        let page = analyzer.end_page().unwrap();

        let LTItem::Figure(fig) = &page.items()[0] else {
            panic!("expected a figure");
        };
        let LTItem::Image(image) = &fig.items()[0] else {
            panic!("expected an image");
        };
        assert_eq!(image.bbox(), (10.0, 20.0, 110.0, 70.0));
        assert_eq!(image.srcsize(), (Some(2), Some(3)));
        assert_eq!(image.bits(), Some(8));
        assert_eq!(image.colorspace(), &["DeviceRGB".to_string()]);
        assert_eq!(image.data().len(), 18);
    }

    #[test]
    fn test_image_outside_figure_ignored() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        analyzer.render_image("Im1", &image_stream()).unwrap();
        assert!(analyzer.end_page().unwrap().items().is_empty());
    }

    #[test]
    fn test_aggregator_drops_only_the_broken_page() {
        let mut aggregator = PDFPageAggregator::new(None, 1);
        let mediabox = (0.0, 0.0, 100.0, 100.0);

        aggregator.begin_page(1, mediabox, MATRIX_IDENTITY);
        aggregator.begin_figure("F1", (0.0, 0.0, 1.0, 1.0), MATRIX_IDENTITY);
        aggregator.end_page(1);

        aggregator.begin_page(2, mediabox, MATRIX_IDENTITY);
        aggregator.end_figure("stray");
        aggregator.end_page(2);

        aggregator.begin_page(3, mediabox, MATRIX_IDENTITY);
        aggregator.paint_path(
            &PDFGraphicState::default(),
            true,
            false,
            false,
            &[m(0.0, 0.0), l(5.0, 5.0)],
        );
        aggregator.end_page(3);

        let pages = aggregator.pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].pageid(), 3);
        assert_eq!(kinds(pages[0].items()), vec!["line"]);
    }
}

// ============================================================================
// Glyphs
// ============================================================================

mod render_char_tests {
    use super::*;

    /// Fixed-pitch font that maps only ASCII.
    #[derive(Debug)]
    struct TestFont;

    impl PDFFont for TestFont {
        fn fontname(&self) -> &str {
            "TestMono"
        }

        fn to_unichr(&self, cid: u32) -> Option<String> {
            (cid < 128)
                .then(|| char::from_u32(cid).map(String::from))
                .flatten()
        }

        fn char_width(&self, _cid: u32) -> f64 {
            0.6
        }
    }

    fn render(analyzer: &mut PDFLayoutAnalyzer, cid: u32, matrix: Matrix) -> f64 {
        let font: Arc<dyn PDFFont> = Arc::new(TestFont);
        analyzer
            .render_char(
                matrix,
                &font,
                10.0,
                1.0,
                0.0,
                cid,
                &PDFColorSpace::predefined("DeviceGray"),
                &PDFGraphicState::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_char_box_and_advance() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        let adv = render(&mut analyzer, u32::from(b'A'), (1.0, 0.0, 0.0, 1.0, 100.0, 200.0));
        assert!((adv - 6.0).abs() < 1e-9);

        let page = analyzer.end_page().unwrap();
        let LTItem::Char(ch) = &page.items()[0] else {
            panic!("expected a char");
        };
        assert_eq!(ch.get_text(), "A");
        assert_eq!(ch.fontname(), "TestMono");
        assert!((ch.x0() - 100.0).abs() < 1e-9);
        assert!((ch.x1() - 106.0).abs() < 1e-9);
        assert!((ch.y0() - 197.5).abs() < 1e-9);
        assert!((ch.y1() - 207.5).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_glyph_placeholder() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        let adv = render(&mut analyzer, 300, MATRIX_IDENTITY);
        assert!(adv > 0.0);
        let page = analyzer.end_page().unwrap();
        let LTItem::Char(ch) = &page.items()[0] else {
            panic!("expected a char");
        };
        assert_eq!(ch.get_text(), "(cid:300)");
    }

    #[test]
    fn test_char_lands_in_open_figure() {
        let mut analyzer = open_analyzer(MATRIX_IDENTITY);
        analyzer
            .begin_figure("F", (0.0, 0.0, 10.0, 10.0), MATRIX_IDENTITY)
            .unwrap();
        render(&mut analyzer, u32::from(b'x'), MATRIX_IDENTITY);
        analyzer.end_figure("F").unwrap();
        let page = analyzer.end_page().unwrap();
        let LTItem::Figure(fig) = &page.items()[0] else {
            panic!("expected a figure");
        };
        assert_eq!(kinds(fig.items()), vec!["char"]);
    }
}

// ============================================================================
// Text rendering
// ============================================================================

mod text_converter_tests {
    use super::*;

    fn raw_box(texts: &[&str], y: f64) -> LTTextBox {
        let mut line = LTTextLine::new(WritingMode::Horizontal, 0.1);
        for (i, text) in texts.iter().enumerate() {
            let x = i as f64 * 10.0;
            line.add(LTChar::with_bbox((x, y, x + 10.0, y + 10.0), text, "F"));
        }
        let mut tb = LTTextBox::new(WritingMode::Horizontal);
        tb.add(line);
        tb
    }

    fn two_box_page(with_paths: bool) -> LTPage {
        let mut page = LTPage::new(1, (0.0, 0.0, 100.0, 100.0));
        if with_paths {
            page.add(LTItem::Rect(LTRect::new(
                (0.0, 0.0, 50.0, 50.0),
                PathStyle::default(),
                Vec::new(),
            )));
        }
        page.add(LTItem::TextBox(raw_box(&["A", "B"], 50.0)));
        page.add(LTItem::TextBox(raw_box(&["C", "D"], 20.0)));
        page
    }

    #[test]
    fn test_boxes_end_with_newline_and_page_with_form_feed() {
        for with_paths in [false, true] {
            let mut conv = TextConverter::new(None, 1, false);
            conv.receive_layout(two_box_page(with_paths));
            assert_eq!(conv.into_text(), "AB\nCD\n\x0c");
        }
    }

    #[test]
    fn test_page_numbers() {
        let mut conv = TextConverter::new(None, 7, true);
        conv.receive_layout(LTPage::new(7, (0.0, 0.0, 10.0, 10.0)));
        conv.receive_layout(LTPage::new(8, (0.0, 0.0, 10.0, 10.0)));
        assert_eq!(conv.text(), "Page 7\n\x0cPage 8\n\x0c");
    }

    struct FailingDescriber;

    impl ImageDescriber for FailingDescriber {
        fn describe(&self, _image: &LTImage) -> Result<String> {
            Err(PdfError::ImageDescription("no model".into()))
        }
    }

    fn image_page() -> LTPage {
        let stream = Stream::new(dictionary! { "Width" => 4, "Height" => 4 }, Vec::new());
        let mut page = LTPage::new(1, (0.0, 0.0, 10.0, 10.0));
        page.add(LTItem::Image(LTImage::new("Im0", &stream, (0.0, 0.0, 4.0, 4.0))));
        page
    }

    #[test]
    fn test_image_description_inline() {
        let mut conv =
            TextConverter::with_describer(None, 1, false, Some(Arc::new(PlaceholderDescriber)));
        conv.receive_layout(image_page());
        assert_eq!(conv.into_text(), "\n[image Im0 4x4]\x0c");
    }

    #[test]
    fn test_image_ignored_without_describer() {
        let mut conv = TextConverter::new(None, 1, false);
        conv.receive_layout(image_page());
        assert_eq!(conv.into_text(), "\x0c");
    }

    #[test]
    fn test_failed_description_contributes_nothing() {
        let mut conv = TextConverter::with_describer(None, 1, false, Some(Arc::new(FailingDescriber)));
        conv.receive_layout(image_page());
        assert_eq!(conv.into_text(), "\x0c");
    }
}

// ============================================================================
// Interpreter driving the devices
// ============================================================================

mod interpreter_tests {
    use super::*;

    fn font_resources() -> Dictionary {
        dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        }
    }

    fn page(resources: Dictionary, contents: &[u8]) -> PDFPage {
        PDFPage {
            index: 0,
            pageid: 1,
            mediabox: (0.0, 0.0, 612.0, 792.0),
            cropbox: (0.0, 0.0, 612.0, 792.0),
            rotate: 0,
            resources,
            contents: contents.to_vec(),
        }
    }

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
    }

    fn run<D: PDFDevice>(doc: &Document, page: &PDFPage, device: &mut D) {
        let mut rsrcmgr = PDFResourceManager::new();
        let mut interpreter = PDFPageInterpreter::new(&mut rsrcmgr, device, doc);
        interpreter.process_page(page);
    }

    fn text_of(doc: &Document, page: &PDFPage, laparams: Option<LAParams>) -> String {
        let mut conv = TextConverter::new(laparams, 1, false);
        run(doc, page, &mut conv);
        conv.into_text()
    }

    #[test]
    fn test_shown_text_with_layout() {
        let doc = Document::with_version("1.5");
        let page = page(font_resources(), b"BT /F1 12 Tf 72 700 Td (AB) Tj ET");
        assert_eq!(text_of(&doc, &page, Some(LAParams::default())), "AB\n\n\x0c");
    }

    #[test]
    fn test_shown_text_without_layout() {
        let doc = Document::with_version("1.5");
        let page = page(font_resources(), b"BT /F1 12 Tf 72 700 Td [(A) -200 (B)] TJ ET");
        assert_eq!(text_of(&doc, &page, None), "AB\x0c");
    }

    #[test]
    fn test_invisible_text_emits_nothing() {
        let doc = Document::with_version("1.5");
        let page = page(font_resources(), b"BT /F1 12 Tf 3 Tr 72 700 Td (hidden) Tj ET");
        assert_eq!(text_of(&doc, &page, Some(LAParams::default())), "\x0c");
    }

    #[test]
    fn test_form_xobject_becomes_figure() {
        let mut doc = Document::with_version("1.5");
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => ints(&[0, 0, 100, 100]),
                "Matrix" => ints(&[1, 0, 0, 1, 50, 50]),
            },
            b"0 0 m 10 0 l S BT /F1 10 Tf (X) Tj ET".to_vec(),
        );
        let form_id = doc.add_object(form);
        let mut resources = font_resources();
        resources.set("XObject", dictionary! { "Fm1" => Object::Reference(form_id) });
        let page = page(resources, b"/Fm1 Do");

        let mut aggregator = PDFPageAggregator::new(None, 1);
        run(&doc, &page, &mut aggregator);
        let ltpage = aggregator.result().expect("page");
        let LTItem::Figure(fig) = &ltpage.items()[0] else {
            panic!("expected a figure");
        };
        assert_eq!(fig.name(), "Fm1");
        assert_eq!(fig.bbox(), (50.0, 50.0, 150.0, 150.0));
        assert_eq!(kinds(fig.items()), vec!["line", "char"]);
        let LTItem::Line(line) = &fig.items()[0] else {
            unreachable!()
        };
        assert_eq!(line.pts(), &[(50.0, 50.0), (60.0, 50.0)]);
        assert!((fig.items()[1].x0() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_xobject_described() {
        let mut doc = Document::with_version("1.5");
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "BitsPerComponent" => 8,
                "ColorSpace" => "DeviceGray",
            },
            vec![0u8; 4],
        );
        let image_id = doc.add_object(image);
        let resources = dictionary! {
            "XObject" => dictionary! { "Im1" => Object::Reference(image_id) },
        };
        let page = page(resources, b"q 100 0 0 50 10 20 cm /Im1 Do Q");

        let mut aggregator = PDFPageAggregator::new(None, 1);
        run(&doc, &page, &mut aggregator);
        let ltpage = aggregator.result().expect("page");
        let LTItem::Figure(fig) = &ltpage.items()[0] else {
            panic!("expected a figure");
        };
        assert_eq!(fig.bbox(), (10.0, 20.0, 110.0, 70.0));
        assert_eq!(kinds(fig.items()), vec!["image"]);

        let mut conv =
            TextConverter::with_describer(None, 1, false, Some(Arc::new(PlaceholderDescriber)));
        run(&doc, &page, &mut conv);
        assert_eq!(conv.into_text(), "\n[image Im1 2x2]\x0c");
    }

    #[test]
    fn test_text_converter_skips_paths() {
        let doc = Document::with_version("1.5");
        let page = page(Dictionary::new(), b"0 0 m 100 0 l 100 100 l h S 10 10 50 50 re f");
        let mut aggregator = PDFPageAggregator::new(None, 1);
        run(&doc, &page, &mut aggregator);
        assert_eq!(kinds(aggregator.result().expect("page").items()), vec!["curve", "rect"]);
        assert_eq!(text_of(&doc, &page, None), "\x0c");
    }
}
