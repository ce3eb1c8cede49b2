use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print rows under `headers` in aligned columns. The row at `marked`, if any,
/// is flagged with a leading `*`.
pub fn print_table(headers: &[&str], rows: &[Vec<String>], marked: Option<usize>) {
    for line in render_table(headers, rows, marked) {
        println!("{line}");
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>], marked: Option<usize>) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .fold(h.len(), usize::max)
        })
        .collect();

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(render_row(" ", headers.iter().copied(), &widths));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push(render_row(" ", rule.iter().map(String::as_str), &widths));
    for (i, row) in rows.iter().enumerate() {
        let gutter = if marked == Some(i) { "*" } else { " " };
        out.push(render_row(gutter, row.iter().map(String::as_str), &widths));
    }
    out
}

fn render_row<'a>(gutter: &str, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:w$}"))
        .collect();
    format!("{gutter} {}", padded.join("  ")).trim_end().to_string()
}

/// Text progress bar, e.g. `[#####-----] 50%`.
pub fn progress_bar(percentage: u32, width: usize) -> String {
    let filled = (percentage.min(100) as usize * width) / 100;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percentage
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_columns_and_marks_one_row() {
        let rows = vec![
            vec!["a1".to_string(), "Rust".to_string()],
            vec!["b22".to_string(), "Go".to_string()],
        ];
        let lines = render_table(&["ID", "TITLE"], &rows, Some(1));
        assert_eq!(
            lines,
            vec![
                "  ID   TITLE",
                "  ---  -----",
                "  a1   Rust",
                "* b22  Go",
            ]
        );
        assert!(render_table(&["ID"], &[], None).len() == 2);
    }

    #[test]
    fn progress_bar_scales() {
        assert_eq!(progress_bar(0, 10), "[----------] 0%");
        assert_eq!(progress_bar(50, 10), "[#####-----] 50%");
        assert_eq!(progress_bar(100, 4), "[####] 100%");
    }
}
