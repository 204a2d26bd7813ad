use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use roster_cli::commands::ImportRun;
use roster_import::{ImportOutcome, ImportReport, SheetSummary};
use roster_model::{Subject, Trainee};
use roster_store::{ClearedRecords, TraineeLookup};

pub fn print_import(run: &ImportRun) {
    let sheet = run.outcome.sheet();
    println!("Store: {}", run.store_key);
    if run.dry_run {
        println!("Dry run: the store was not modified.");
    }
    println!("{}", sheet_line(sheet));
    match &run.outcome {
        ImportOutcome::Imported { report, .. } => {
            println!("{}", report_table(report));
            println!("{report}");
        }
        ImportOutcome::NothingToImport { .. } => {
            println!("Nothing to import: no row held a usable trainee id and course code.");
        }
    }
}

fn sheet_line(sheet: &SheetSummary) -> String {
    let encoding = sheet
        .encoding
        .map(|name| format!(", {name}"))
        .unwrap_or_default();
    format!(
        "Sheet: {}{encoding}, header on row {}, {} of {} data rows used ({} skipped)",
        sheet.format,
        sheet.header_row + 1,
        sheet.stats.accepted_rows,
        sheet.stats.data_rows,
        sheet.stats.skipped_rows(),
    )
}

pub fn report_table(report: &ImportReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Records"),
        header_cell("Created"),
        header_cell("Existing"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new("Subjects"),
        count_cell(report.subjects_created, Color::Green),
        Cell::new(report.subjects_reused),
        Cell::new(report.subjects_total()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Trainees"),
        count_cell(report.trainees_created, Color::Green),
        Cell::new(report.trainees_updated),
        Cell::new(report.trainees_total()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Unresolved codes"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(report.unresolved_codes, Color::Yellow),
    ]);
    table
}

pub fn print_lookup(query: &str, lookup: Option<&TraineeLookup>) {
    let Some(lookup) = lookup else {
        println!("No trainee matches {query:?}.");
        return;
    };
    let trainee = &lookup.trainee;
    println!("{} ({})", display_name(trainee), trainee.id);
    println!("Matched by {}", lookup.matched_by.label());
    if !trainee.major.is_empty() {
        println!("Major: {}", trainee.major);
    }
    if lookup.remaining.is_empty() {
        println!("No remaining subjects.");
        return;
    }
    println!("{}", subject_table(&lookup.remaining));
}

pub fn subject_table(subjects: &[Subject]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Code"),
        header_cell("Name"),
        header_cell("Hours"),
        header_cell("Id"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for subject in subjects {
        table.add_row(vec![
            Cell::new(subject.level),
            Cell::new(&subject.code).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(&subject.name),
            Cell::new(subject.credit_hours),
            dim_cell(&subject.id),
        ]);
    }
    table
}

pub fn trainee_table(trainees: &[Trainee]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Trainee no."),
        header_cell("National id"),
        header_cell("Phone"),
        header_cell("Remaining"),
        header_cell("Id"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for trainee in trainees {
        table.add_row(vec![
            Cell::new(display_name(trainee)),
            text_cell(&trainee.trainee_number),
            text_cell(&trainee.national_id),
            text_cell(&trainee.phone_number),
            count_cell(trainee.remaining_count(), Color::Red),
            dim_cell(&trainee.id),
        ]);
    }
    table
}

pub fn print_cleared(cleared: ClearedRecords) {
    println!(
        "Deleted {} subjects and {} trainees.",
        cleared.subjects, cleared.trainees
    );
}

fn display_name(trainee: &Trainee) -> &str {
    if trainee.full_name.is_empty() {
        "(no name)"
    } else {
        &trainee.full_name
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn text_cell(value: &str) -> Cell {
    if value.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use roster_ingest::{ExtractionStats, SourceFormat};
    use roster_model::{NewSubject, NewTrainee, RecordId};

    #[test]
    fn test_sheet_line() {
        let sheet = SheetSummary {
            format: SourceFormat::Text,
            encoding: Some("UTF-8"),
            header_row: 2,
            trainees: 2,
            subjects: 3,
            stats: ExtractionStats {
                data_rows: 6,
                accepted_rows: 4,
                skipped_missing_identity: 1,
                skipped_short_identity: 0,
                skipped_missing_code: 1,
            },
        };
        assert_snapshot!(
            sheet_line(&sheet),
            @"Sheet: text, UTF-8, header on row 3, 4 of 6 data rows used (2 skipped)"
        );
    }

    #[test]
    fn test_report_table_lists_counts() {
        let report = ImportReport {
            subjects_created: 2,
            subjects_reused: 5,
            trainees_created: 1,
            trainees_updated: 3,
            unresolved_codes: 4,
            batches_committed: 2,
        };
        let rendered = report_table(&report).to_string();
        assert!(rendered.contains("Subjects"));
        assert!(rendered.contains("Unresolved codes"));
        assert!(rendered.contains('7'));
    }

    #[test]
    fn test_trainee_table_shows_remaining_count() {
        let mut trainee = NewTrainee {
            full_name: "Sara".to_string(),
            ..NewTrainee::default()
        }
        .with_id(RecordId::new("t-1").unwrap());
        trainee
            .failed_subject_ids
            .extend([RecordId::new("s-1").unwrap(), RecordId::new("s-2").unwrap()]);
        let rendered = trainee_table(&[trainee]).to_string();
        assert!(rendered.contains("Sara"));
        assert!(rendered.contains("t-1"));
        assert!(rendered.contains('2'));
    }

    #[test]
    fn test_subject_table() {
        let subject = NewSubject::new("MTH101", "Calculus").with_id(RecordId::new("s-1").unwrap());
        let rendered = subject_table(&[subject]).to_string();
        assert!(rendered.contains("MTH101"));
        assert!(rendered.contains("Calculus"));
    }
}
