//! Text renderings of a record set for people and for other tools.
//!
//! # Listing
//!
//! One entry per record: an optional 1-based line number and TAB, then `ok`
//! or `err:<code>`, a TAB, and the command. Entries end in `\n`, or in NUL
//! for `xargs -0` style consumers.
//!
//! ```text
//! 1	ok	make
//! 2	err:2	make test
//! ```
//!
//! # Bash History
//!
//! Two lines per record, as bash writes `HISTFILE` with `HISTTIMEFORMAT` set:
//!
//! ```text
//! #1614834367
//! make
//! ```

use std::io::{self, Write};

use crate::types::Record;

/// How a listing is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    /// Prefix each entry with its 1-based position.
    pub line_numbers: bool,
    /// Terminate entries with NUL instead of newline.
    pub print0: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        ListingOptions {
            line_numbers: true,
            print0: false,
        }
    }
}

/// Renders one listing entry without its terminator.
pub fn listing_entry(position: usize, record: &Record, line_numbers: bool) -> String {
    let mut entry = String::with_capacity(record.command.len() + 16);
    if line_numbers {
        entry.push_str(&position.to_string());
        entry.push('\t');
    }
    if record.succeeded() {
        entry.push_str("ok\t");
    } else {
        entry.push_str(&format!("err:{}\t", record.exit_code));
    }
    entry.push_str(&record.command);
    entry
}

/// Writes `records` as a listing.
pub fn write_listing<W: Write>(
    out: &mut W,
    records: &[Record],
    options: ListingOptions,
) -> io::Result<()> {
    let terminator: &[u8] = if options.print0 { b"\0" } else { b"\n" };
    for (i, record) in records.iter().enumerate() {
        out.write_all(listing_entry(i + 1, record, options.line_numbers).as_bytes())?;
        out.write_all(terminator)?;
    }
    Ok(())
}

/// Writes `records` in bash's timestamped history format.
pub fn write_bash_history<W: Write>(out: &mut W, records: &[Record]) -> io::Result<()> {
    for record in records {
        writeln!(out, "#{}", record.unix_seconds())?;
        writeln!(out, "{}", record.command)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{record_at, record_with_exit};

    fn render(records: &[Record], options: ListingOptions) -> String {
        let mut out = Vec::new();
        write_listing(&mut out, records, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn listing_with_line_numbers() {
        let records = vec![record_at(1, "make"), record_with_exit(2, "make test", 2)];
        assert_eq!(
            render(&records, ListingOptions::default()),
            "1\tok\tmake\n2\terr:2\tmake test\n"
        );
    }

    #[test]
    fn listing_without_line_numbers_nul_terminated() {
        let records = vec![record_at(1, "a"), record_with_exit(2, "b", 1)];
        let options = ListingOptions {
            line_numbers: false,
            print0: true,
        };
        assert_eq!(render(&records, options), "ok\ta\0err:1\tb\0");
    }

    #[test]
    fn negative_exit_codes_are_rendered() {
        assert_eq!(
            listing_entry(7, &record_with_exit(1, "x", -1), true),
            "7\terr:-1\tx"
        );
    }

    #[test]
    fn bash_history_pairs() {
        let records = vec![record_at(1_614_834_367, "make"), record_at(1_614_834_400, "ls")];
        let mut out = Vec::new();
        write_bash_history(&mut out, &records).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#1614834367\nmake\n#1614834400\nls\n"
        );
    }

    #[test]
    fn empty_sets_render_nothing() {
        assert_eq!(render(&[], ListingOptions::default()), "");
        let mut out = Vec::new();
        write_bash_history(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
