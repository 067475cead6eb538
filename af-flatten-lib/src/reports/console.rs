use crate::Result;
use crate::table::Table;
use core::fmt::Write;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

const NULL_CELL: &str = "null";

/// Write a summary of the table followed by a preview of its first `preview_rows` rows.
pub fn generate<W: Write>(table: &Table, preview_rows: usize, use_colors: bool, writer: &mut W) -> Result<()> {
    render(table, preview_rows, use_colors, get_terminal_width(), writer)
}

fn render<W: Write>(table: &Table, preview_rows: usize, use_colors: bool, width: usize, writer: &mut W) -> Result<()> {
    writeln!(writer, "Parsed {} AF attributes", table.row_count())?;

    let max_name_len = table.column_names().map(str::len).max().unwrap_or(0);
    // "  " + name + " : "
    let value_indent = 2 + max_name_len + 3;

    let preview = table.head(preview_rows);
    for (index, row) in preview.iter().enumerate() {
        writeln!(writer)?;
        let title = format!("[{}] {} :: {}", index + 1, row.element_path, row.attribute_path);
        if use_colors {
            writeln!(writer, "{}", title.bold())?;
        } else {
            writeln!(writer, "{title}")?;
        }

        for (name, cell) in table.column_names().zip(table.cells(row)) {
            let value = cell.unwrap_or(NULL_CELL);
            let lines = wrap_text(value, width, value_indent);

            if let Some(first_line) = lines.first() {
                if use_colors && cell.is_none() {
                    writeln!(writer, "  {name:<max_name_len$} : {}", first_line.dimmed())?;
                } else {
                    writeln!(writer, "  {name:<max_name_len$} : {first_line}")?;
                }

                for line in lines.iter().skip(1) {
                    writeln!(writer, "{line}")?;
                }
            }
        }
    }

    writeln!(writer)?;
    if preview.len() < table.row_count() {
        writeln!(writer, "Showing {} of {} rows", preview.len(), table.row_count())?;
    }

    writeln!(writer, "Local shape: ({}, {})", table.row_count(), table.column_count())?;
    writeln!(writer, "Columns: [{}]", table.column_names().collect::<Vec<_>>().join(", "))?;

    Ok(())
}

/// Get the terminal width, defaulting to 80 if not detectable
fn get_terminal_width() -> usize {
    terminal_size().map_or(80, |(Width(w), _)| usize::from(w))
}

/// Word-wrap text to fit within a given width, with indentation for continuation lines
fn wrap_text(text: &str, width: usize, indent: usize) -> Vec<String> {
    if width <= indent {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let separator_len = usize::from(!current_line.is_empty());
        if !current_line.is_empty() && indent + current_line.chars().count() + separator_len + word.chars().count() > width {
            lines.push(current_line);
            current_line = word.to_string();
        } else {
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| if i == 0 { line } else { format!("{:indent$}{line}", "") })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{Attribute, Element, flatten};

    fn sample_table(attribute_count: usize) -> Table {
        let mut element = Element::new("Well A");
        for i in 0..attribute_count {
            element = element.with_attribute(Attribute::new(format!("A{i}")).with_value("1"));
        }
        Table::assemble(flatten(&[element]))
    }

    #[test]
    fn test_empty_table() {
        let mut output = String::new();
        render(&Table::assemble(Vec::new()), 10, false, 80, &mut output).unwrap();

        assert_eq!(output, "Parsed 0 AF attributes\n\nLocal shape: (0, 0)\nColumns: []\n");
    }

    #[test]
    fn test_preview_is_limited() {
        let mut output = String::new();
        render(&sample_table(5), 2, false, 80, &mut output).unwrap();

        assert!(output.starts_with("Parsed 5 AF attributes\n"));
        assert!(output.contains("[1] Well A :: A0"));
        assert!(output.contains("[2] Well A :: A1"));
        assert!(!output.contains("[3]"));
        assert!(output.contains("Showing 2 of 5 rows"));
        assert!(output.contains("Local shape: (5, 10)"));
    }

    #[test]
    fn test_null_cells_are_marked() {
        let mut output = String::new();
        render(&sample_table(1), 10, false, 80, &mut output).unwrap();

        assert!(output.contains("  element_template : null\n"));
        assert!(output.contains("  static_value     : 1\n"));
        assert!(!output.contains("Showing"));
    }

    #[test]
    fn test_wrap_text_indents_continuations() {
        let lines = wrap_text("alpha beta gamma", 12, 4);
        assert_eq!(lines, vec!["alpha".to_string(), "    beta".to_string(), "    gamma".to_string()]);
    }

    #[test]
    fn test_wrap_text_narrow_terminal() {
        assert_eq!(wrap_text("alpha beta", 4, 4), vec!["alpha beta".to_string()]);
    }
}
