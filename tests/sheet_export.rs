use gradesheet::downloader::{to_csv, to_xlsx};
use gradesheet::gradebook::{Gradebook, HeaderField, ScorePart};
use gradesheet::grid::{COLUMN_PADDING, FIRST_STUDENT_ROW, GROUP_HEADER_ROW, SUB_HEADER_ROW};
use gradesheet::labels;
use gradesheet::{Cell, CellRange};

fn sample_book() -> Gradebook {
    let mut book = Gradebook::with_subjects(["Maths", "Science"]);
    book.set_header(HeaderField::School, "Green Valley");
    let asha = book.add_student("Asha").unwrap();
    book.set_score(asha, "Maths", ScorePart::Theory, "95").unwrap();
    book.set_score(asha, "Maths", ScorePart::Practical, "10").unwrap();
    book.set_score(asha, "Science", ScorePart::Theory, "abc").unwrap();
    book.set_score(asha, "Science", ScorePart::Practical, "40").unwrap();
    book.add_student("Ravi");
    book
}

fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

#[test]
fn header_lines_fill_the_first_rows() {
    let grid = sample_book().sheet_grid().unwrap();

    assert_eq!(
        *grid.cell(0, 0),
        text(&format!("{}Green Valley", labels::SCHOOL_PREFIX))
    );
    for (row, field) in HeaderField::ORDER.iter().enumerate() {
        assert_eq!(grid.rows[row].len(), 1);
        assert_eq!(grid.cell(row as u32, 0).to_string(), sample_book().header.line(*field));
    }
    assert!(grid.rows[7].is_empty());
}

#[test]
fn table_headers_follow_the_subject_order() {
    let grid = sample_book().sheet_grid().unwrap();
    let group = &grid.rows[GROUP_HEADER_ROW as usize];
    let sub = &grid.rows[SUB_HEADER_ROW as usize];

    assert_eq!(group.len(), 1 + 4 * 2 + 5);
    assert_eq!(group[0], text(labels::STUDENT_NAME));
    assert_eq!(group[1], text("Maths"));
    assert_eq!(group[2], Cell::Blank);
    assert_eq!(group[5], text("Science"));
    assert_eq!(group[9], text(labels::OVERALL_TOTAL));
    assert_eq!(group[13], text(labels::REMARK));

    assert_eq!(sub[0], Cell::Blank);
    assert_eq!(sub[1], text(labels::THEORY));
    assert_eq!(sub[4], text(labels::GRADE));
    assert_eq!(sub[8], text(labels::GRADE));
    assert_eq!(sub[9..], [text(" "), text(" "), text(" ")]);
}

#[test]
fn student_rows_use_raw_totals() {
    let grid = sample_book().sheet_grid().unwrap();
    let asha = &grid.rows[FIRST_STUDENT_ROW as usize];

    assert_eq!(asha[0], text("Asha"));
    assert_eq!(asha[1], text("95"));
    assert_eq!(asha[2], text("10"));
    assert_eq!(asha[3], Cell::Number(105.0));
    assert_eq!(asha[4], text("अ १"));

    // A non-number marks both export cells while the live total uses 0.
    assert_eq!(asha[5], text("abc"));
    assert_eq!(asha[7], text(labels::NAN_MARKER));
    assert_eq!(asha[8], text(labels::NAN_MARKER));

    assert_eq!(asha[9], text("145.00"));
    assert_eq!(asha[10], text("72.50"));
    assert_eq!(asha[11], text("ब १"));
    assert_eq!(asha[13], text(labels::PASS));
}

#[test]
fn empty_scores_export_as_blank_with_zero_total() {
    let grid = sample_book().sheet_grid().unwrap();
    let ravi = &grid.rows[FIRST_STUDENT_ROW as usize + 1];

    assert_eq!(ravi[1], Cell::Blank);
    assert_eq!(ravi[2], Cell::Blank);
    assert_eq!(ravi[3], Cell::Number(0.0));
    assert_eq!(ravi[4], text("इ २"));
    assert_eq!(ravi[9], text("0.00"));
    assert_eq!(ravi[13], text(labels::FAIL));
}

#[test]
fn subject_groups_are_merged_four_wide() {
    let mut book = Gradebook::with_subjects(["A", "B", "C", "D", "E", "F", "G"]);
    book.add_student("Asha");
    let grid = book.sheet_grid().unwrap();

    assert_eq!(grid.merges[0], CellRange::new(0, 0, 0, 2));
    for row in 1..=6 {
        assert_eq!(grid.merges[row as usize], CellRange::single(row, 0));
    }
    let groups = &grid.merges[7..];
    assert_eq!(groups.len(), 7);
    for (i, range) in groups.iter().enumerate() {
        let i = i as u16;
        assert_eq!(range.first_row, GROUP_HEADER_ROW);
        assert_eq!(range.last_row, GROUP_HEADER_ROW);
        assert_eq!(range.first_col, 1 + 4 * i);
        assert_eq!(range.last_col, 4 + 4 * i);
    }
    assert_eq!(groups[6].a1(), "Z9:AC9");
}

#[test]
fn column_widths_are_widest_cell_plus_padding() {
    let grid = sample_book().sheet_grid().unwrap();
    assert_eq!(grid.column_widths.len(), grid.width());

    for (col, width) in grid.column_widths.iter().enumerate() {
        let widest = grid
            .rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(Cell::width)
            .max()
            .unwrap_or(0);
        assert_eq!(*width, widest as f64 + COLUMN_PADDING);
    }
    // Column 0 holds the school line, the widest text of the sheet.
    let school = format!("{}Green Valley", labels::SCHOOL_PREFIX);
    assert!(grid.column_widths[0] >= school.chars().count() as f64 + COLUMN_PADDING);
}

#[test]
fn roster_without_students_still_exports_headers() {
    let book = Gradebook::new();
    let grid = book.sheet_grid().unwrap();
    assert_eq!(grid.height(), FIRST_STUDENT_ROW as usize);
    assert_eq!(grid.merges.len(), 8);
}

#[test]
fn csv_export_quotes_and_keeps_markers() {
    let mut book = sample_book();
    let id = book.id_at(1).unwrap();
    book.rename_student(id, "Ravi, Jr.").unwrap();

    let csv = to_csv(&book.sheet_grid().unwrap());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[7], "");
    assert!(lines[10].starts_with("Asha,95,10,105,अ १,abc,40,NaN,NaN,145.00,72.50,"));
    assert!(lines[11].starts_with("\"Ravi, Jr.\",,,0,इ २,"));
}

#[test]
fn xlsx_export_is_a_zip_container() {
    let bytes = to_xlsx(&sample_book().sheet_grid().unwrap()).unwrap();
    assert!(bytes.len() > 100);
    assert_eq!(&bytes[..4], b"PK\x03\x04");
}

#[cfg(feature = "render")]
#[test]
fn png_export_writes_an_image_or_reports_missing_fonts() {
    use gradesheet::GradeError;
    use gradesheet::raster::{RasterOptions, rasterize};

    match rasterize(&sample_book().sheet_grid().unwrap(), &RasterOptions::default()) {
        Ok(bytes) => assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n"),
        // Headless machines may have no usable system font.
        Err(GradeError::Raster(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn two_decimal_cells_round_the_stored_value() {
    let mut book = Gradebook::with_subjects(["Maths"]);
    let id = book.add_student("Asha").unwrap();
    book.set_score(id, "Maths", ScorePart::Theory, "72.345").unwrap();

    let computed = &book.computed().unwrap()[0];
    assert_eq!(computed.subjects[0].total_display(), "72.34");
    assert_eq!(computed.overall_total_display(), "72.34");

    let grid = book.sheet_grid().unwrap();
    let row = &grid.rows[FIRST_STUDENT_ROW as usize];
    assert_eq!(row[1], text("72.345"));
    assert_eq!(row[5], text("72.34"));
    assert_eq!(row[6], text("72.34"));
}

#[test]
fn subjects_beyond_the_worksheet_width_are_rejected() {
    use gradesheet::GradeError;
    use gradesheet::grid::MAX_COLUMNS;

    let names = |count: usize| (0..count).map(|i| format!("S{}", i)).collect::<Vec<_>>();

    let mut widest = Gradebook::with_subjects(names(4094));
    widest.add_student("Asha");
    let grid = widest.sheet_grid().unwrap();
    assert_eq!(grid.width(), 16_382);
    assert_eq!(grid.merges.last().unwrap().last_col, 16_376);

    let mut too_wide = Gradebook::with_subjects(names(4095));
    too_wide.add_student("Asha");
    match too_wide.sheet_grid() {
        Err(GradeError::TooManyColumns(width)) => assert!(width > MAX_COLUMNS),
        other => panic!("expected TooManyColumns, got {:?}", other.map(|g| g.width())),
    }
}
