use owo_colors::{AnsiColors, OwoColorize, Stream};

pub fn jdk_color() -> AnsiColors {
    AnsiColors::Cyan
}

/// Renders rows as left-aligned columns separated by two spaces, header first.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths = header.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let render_row = |cells: &mut dyn Iterator<Item = &str>| {
        cells
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_row(&mut header.iter().copied()));
    for row in rows {
        lines.push(render_row(&mut row.iter().map(String::as_str)));
    }
    lines
}

pub fn print_table(header: &[&str], rows: &[Vec<String>]) {
    let mut lines = render_table(header, rows).into_iter();
    if let Some(header_line) = lines.next() {
        println!(
            "{}",
            header_line.if_supports_color(Stream::Stdout, |s| s.bold())
        );
    }
    for line in lines {
        println!("{}", line);
    }
}
